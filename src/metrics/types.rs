use serde::Serialize;

/// The two goal tiers inferred from a month's daily goals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeeklyGoalTiers {
    /// The larger of the two distinct daily goal values (Mon-Fri tier).
    pub weekday_goal: f64,
    /// The smaller tier (Saturday). 0 when the month has a single tier.
    pub saturday_goal: f64,
}

/// The strongest sales day of the month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BestDay {
    pub day: u32,
    pub amount: f64,
}

/// Scalar KPIs derived from one seller's sales report.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedMetrics {
    /// Accumulated sales over monthly goal, as a percentage. 0 when the goal
    /// is missing or non-positive.
    pub performance_pct: f64,
    /// Mean over days with recorded (positive) sales. None before the first
    /// sale of the month.
    pub avg_daily_sales: Option<f64>,
    /// Accumulated sales spread over the days elapsed so far (the KPI-card
    /// figure, which counts zero-sales days too). 0 on day 0.
    pub daily_pace: f64,
    /// Growth versus the previous month. None when the previous month has no
    /// sales to compare against.
    pub growth_pct: Option<f64>,
    pub weekly_goals: WeeklyGoalTiers,
    /// None until more than 3 days have positive sales.
    pub best_day: Option<BestDay>,
    pub days_remaining: u32,
    pub month_elapsed_pct: f64,
    /// Monthly goal spread evenly across the month (chart reference line).
    pub avg_daily_goal: f64,
}
