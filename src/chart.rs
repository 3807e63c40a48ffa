//! Chart-ready daily series.
//!
//! Transforms the day-indexed report maps into ordered per-day records for a
//! rendering layer. Stacked met/missed buckets are mutually exclusive, and
//! series that plot as lines or areas expose "no data yet" as `None` rather
//! than a literal 0 so unfilled future days do not draw a zero trough.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::report::{CurrentMonth, ProjectionReport};

/// One day of the sales-vs-goal chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDayRecord {
    pub day: u32,
    pub sales: f64,
    pub goal: f64,
    /// `sales >= goal && goal > 0`.
    pub met_goal: bool,
    /// `sales / goal * 100`, 0 when the goal is non-positive.
    pub compliance_pct: f64,
    /// Full sales value when the goal was met, else 0.
    pub sales_met: f64,
    /// Full sales value when a positive goal was missed, else 0.
    pub sales_missed: f64,
}

/// One day of the real-vs-projected chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionDayRecord {
    pub day: u32,
    /// Recorded sales; `None` for days with nothing recorded yet.
    pub actual: Option<f64>,
    /// Projected sales; `None` where the projection holds 0.
    pub projected: Option<f64>,
    /// Daily goal. A zero here is a true zero, not missing data.
    pub goal: f64,
}

/// Build the per-day sales/goal series, one record per `daily_sales` key in
/// ascending day order.
pub fn daily_series(current: &CurrentMonth) -> Vec<ChartDayRecord> {
    current
        .daily_sales
        .iter()
        .map(|(&day, &sales)| {
            let goal = current.goal_for(day);
            let met_goal = sales >= goal && goal > 0.0;
            let compliance_pct = if goal > 0.0 { sales / goal * 100.0 } else { 0.0 };
            ChartDayRecord {
                day,
                sales,
                goal,
                met_goal,
                compliance_pct,
                sales_met: if met_goal { sales } else { 0.0 },
                sales_missed: if !met_goal && goal > 0.0 { sales } else { 0.0 },
            }
        })
        .collect()
}

/// Join the projection sequence to days by positional index.
///
/// The upstream contract is positional: index 0 is day 1, contiguously. A
/// length mismatch would silently shift every projected value onto the wrong
/// day, so it is rejected instead of aligned best-effort.
pub fn projection_series(
    current: &CurrentMonth,
    projection: &ProjectionReport,
) -> Result<Vec<ProjectionDayRecord>> {
    let days = current.daily_sales.len();
    if projection.projected_sales.len() != days {
        return Err(Error::ProjectionMismatch {
            projected: projection.projected_sales.len(),
            days,
        });
    }

    Ok(current
        .daily_sales
        .iter()
        .zip(&projection.projected_sales)
        .map(|((&day, &sales), &projected)| ProjectionDayRecord {
            day,
            actual: (sales > 0.0).then_some(sales),
            projected: (projected > 0.0).then_some(projected),
            goal: current.goal_for(day),
        })
        .collect())
}
