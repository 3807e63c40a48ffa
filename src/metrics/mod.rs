//! Derived KPI computations.
//!
//! Everything here is pure and synchronous: functions take already-fetched
//! report values and return scalars. Division guards degrade to zero (or
//! `None`) instead of surfacing NaN/Infinity.

pub mod types;

pub use types::*;

use std::collections::BTreeMap;

use crate::report::{CurrentMonth, SalesReport};

/// Projected performance below this percentage triggers the advisory.
pub const LOW_PROJECTION_THRESHOLD_PCT: f64 = 80.0;

/// Days with positive sales required before a best day is reported.
const BEST_DAY_MIN_SAMPLE: usize = 3;

/// Accumulated sales over goal as a percentage. 0 when `goal <= 0`.
pub fn performance_pct(accumulated: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        0.0
    } else {
        accumulated / goal * 100.0
    }
}

/// Growth versus the previous period as a percentage.
///
/// Returns `None` when `previous <= 0`: a month with no prior baseline has no
/// meaningful growth rate, and reporting it as such beats an Infinity artifact.
pub fn growth_pct(current: f64, previous: f64) -> Option<f64> {
    if previous <= 0.0 {
        None
    } else {
        Some((current - previous) / previous * 100.0)
    }
}

/// Mean sales over days that actually recorded a sale.
///
/// Days at 0 (including future days, which the upstream fills with 0) are
/// excluded from the denominator. `None` when no day has sales yet.
pub fn average_daily_sales(daily_sales: &BTreeMap<u32, f64>) -> Option<f64> {
    let positive: Vec<f64> = daily_sales.values().copied().filter(|v| *v > 0.0).collect();
    if positive.is_empty() {
        None
    } else {
        Some(positive.iter().sum::<f64>() / positive.len() as f64)
    }
}

/// Accumulated sales divided by days elapsed, zero-sales days included.
pub fn daily_pace(accumulated: f64, current_day: u32) -> f64 {
    if current_day == 0 {
        0.0
    } else {
        accumulated / current_day as f64
    }
}

/// Infer the weekday and Saturday goal tiers from the daily goal map.
///
/// Heuristic: the two largest distinct positive goal values are taken as the
/// weekday tier (larger) and Saturday tier (smaller); a missing tier is 0.
/// This stands in for an explicit weekday calendar and misclassifies months
/// with more than two goal tiers (e.g. holiday-adjusted days).
pub fn weekly_goal_tiers(daily_goals: &BTreeMap<u32, f64>) -> WeeklyGoalTiers {
    let mut distinct: Vec<f64> = daily_goals.values().copied().filter(|v| *v > 0.0).collect();
    distinct.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    distinct.dedup();
    WeeklyGoalTiers {
        weekday_goal: distinct.first().copied().unwrap_or(0.0),
        saturday_goal: distinct.get(1).copied().unwrap_or(0.0),
    }
}

/// The day with the highest recorded sale.
///
/// Requires more than [`BEST_DAY_MIN_SAMPLE`] days with positive sales;
/// below that the sample is too thin to call any day "best".
pub fn best_day(daily_sales: &BTreeMap<u32, f64>) -> Option<BestDay> {
    let positive: Vec<(u32, f64)> = daily_sales
        .iter()
        .filter(|(_, v)| **v > 0.0)
        .map(|(d, v)| (*d, *v))
        .collect();
    if positive.len() <= BEST_DAY_MIN_SAMPLE {
        return None;
    }
    positive
        .into_iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(day, amount)| BestDay { day, amount })
}

/// Whether the projected performance warrants the low-projection advisory.
/// The boundary is strict: exactly 80% does not alert.
pub fn low_projection_alert(performance_pct: f64) -> bool {
    performance_pct < LOW_PROJECTION_THRESHOLD_PCT
}

pub fn days_remaining(current: &CurrentMonth) -> u32 {
    current.days_in_month.saturating_sub(current.current_day)
}

pub fn month_elapsed_pct(current: &CurrentMonth) -> f64 {
    if current.days_in_month == 0 {
        0.0
    } else {
        current.current_day as f64 / current.days_in_month as f64 * 100.0
    }
}

/// Monthly goal spread evenly across the month.
pub fn average_daily_goal(current: &CurrentMonth) -> f64 {
    if current.days_in_month == 0 {
        0.0
    } else {
        current.goal / current.days_in_month as f64
    }
}

impl DerivedMetrics {
    pub fn from_report(report: &SalesReport) -> Self {
        let current = &report.current;
        DerivedMetrics {
            performance_pct: performance_pct(current.accumulated_sales, current.goal),
            avg_daily_sales: average_daily_sales(&current.daily_sales),
            daily_pace: daily_pace(current.accumulated_sales, current.current_day),
            growth_pct: growth_pct(current.accumulated_sales, report.previous.sales),
            weekly_goals: weekly_goal_tiers(&current.daily_goals),
            best_day: best_day(&current.daily_sales),
            days_remaining: days_remaining(current),
            month_elapsed_pct: month_elapsed_pct(current),
            avg_daily_goal: average_daily_goal(current),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day_map(pairs: &[(u32, f64)]) -> BTreeMap<u32, f64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_performance_pct_guards_non_positive_goal() {
        assert_eq!(performance_pct(8000.0, 0.0), 0.0);
        assert_eq!(performance_pct(8000.0, -100.0), 0.0);
        assert!(performance_pct(8000.0, 0.0).is_finite());
    }

    #[test]
    fn test_performance_pct_basic() {
        assert_eq!(performance_pct(8000.0, 10000.0), 80.0);
        assert_eq!(performance_pct(12000.0, 10000.0), 120.0);
    }

    #[test]
    fn test_growth_pct() {
        assert_eq!(growth_pct(11000.0, 10000.0), Some(10.0));
        assert_eq!(growth_pct(9000.0, 10000.0), Some(-10.0));
        assert_eq!(growth_pct(5000.0, 0.0), None);
        assert_eq!(growth_pct(5000.0, -1.0), None);
    }

    #[test]
    fn test_average_daily_sales_excludes_zero_days() {
        let sales = day_map(&[(1, 50.0), (2, 0.0), (3, 75.0)]);
        assert_eq!(average_daily_sales(&sales), Some(62.5));
    }

    #[test]
    fn test_average_daily_sales_empty_month() {
        let sales = day_map(&[(1, 0.0), (2, 0.0)]);
        assert_eq!(average_daily_sales(&sales), None);
    }

    #[test]
    fn test_daily_pace() {
        assert_eq!(daily_pace(8000.0, 16), 500.0);
        assert_eq!(daily_pace(8000.0, 0), 0.0);
    }

    #[test]
    fn test_weekly_goal_tiers_two_values() {
        let goals = day_map(&[
            (1, 100.0),
            (2, 100.0),
            (3, 100.0),
            (4, 100.0),
            (5, 100.0),
            (6, 60.0),
        ]);
        assert_eq!(
            weekly_goal_tiers(&goals),
            WeeklyGoalTiers {
                weekday_goal: 100.0,
                saturday_goal: 60.0
            }
        );
    }

    #[test]
    fn test_weekly_goal_tiers_single_value() {
        let goals = day_map(&[(1, 100.0), (2, 100.0)]);
        let tiers = weekly_goal_tiers(&goals);
        assert_eq!(tiers.weekday_goal, 100.0);
        assert_eq!(tiers.saturday_goal, 0.0);
    }

    #[test]
    fn test_weekly_goal_tiers_ignores_zero_days() {
        let goals = day_map(&[(1, 0.0), (7, 0.0)]);
        assert_eq!(weekly_goal_tiers(&goals), WeeklyGoalTiers::default());
    }

    #[test]
    fn test_best_day_needs_more_than_three_samples() {
        // Three positive days: not enough, even with a huge outlier.
        let sales = day_map(&[(1, 50.0), (2, 99999.0), (3, 75.0), (4, 0.0)]);
        assert_eq!(best_day(&sales), None);

        let sales = day_map(&[(1, 50.0), (2, 99999.0), (3, 75.0), (4, 10.0)]);
        assert_eq!(
            best_day(&sales),
            Some(BestDay {
                day: 2,
                amount: 99999.0
            })
        );
    }

    #[test]
    fn test_low_projection_alert_boundary() {
        assert!(low_projection_alert(75.0));
        assert!(low_projection_alert(79.9));
        assert!(!low_projection_alert(80.0));
        assert!(!low_projection_alert(95.0));
    }

    #[test]
    fn test_month_progress() {
        let current = crate::report::CurrentMonth {
            accumulated_sales: 8000.0,
            goal: 10000.0,
            current_day: 15,
            days_in_month: 30,
            daily_sales: BTreeMap::new(),
            daily_goals: BTreeMap::new(),
            projected_sales: 0.0,
            daily_projection: 0.0,
        };
        assert_eq!(days_remaining(&current), 15);
        assert_eq!(month_elapsed_pct(&current), 50.0);
        assert!((average_daily_goal(&current) - 333.333).abs() < 0.001);
    }
}
