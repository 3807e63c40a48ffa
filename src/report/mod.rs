//! Validated report types.
//!
//! Reports are immutable, request-scoped values. They carry no identity
//! beyond the [`SellerKey`](crate::SellerKey) that produced them and are
//! re-fetched (or served from cache) per dashboard view.

pub mod wire;

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use wire::{ProjectionReportWire, RawScalar, SalesReportWire};

/// Monthly sales report for one seller, validated at the fetch boundary.
#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub seller: SellerInfo,
    pub current: CurrentMonth,
    pub previous: PreviousMonth,
    pub pending_quotes: PendingQuotes,
}

#[derive(Debug, Clone, Serialize)]
pub struct SellerInfo {
    pub company_short: String,
    pub company_long: String,
    pub seller_name: String,
    pub month_name: String,
    pub year: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentMonth {
    pub accumulated_sales: f64,
    pub goal: f64,
    pub current_day: u32,
    pub days_in_month: u32,
    /// Sales amount per day of month. Days with no recorded sale hold 0.
    pub daily_sales: BTreeMap<u32, f64>,
    /// Goal amount per day of month.
    pub daily_goals: BTreeMap<u32, f64>,
    pub projected_sales: f64,
    pub daily_projection: f64,
}

impl CurrentMonth {
    /// Goal for a given day; a day absent from `daily_goals` degrades to 0.
    pub fn goal_for(&self, day: u32) -> f64 {
        self.daily_goals.get(&day).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviousMonth {
    pub sales: f64,
    pub goal: f64,
    pub performance_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingQuotes {
    pub count: u32,
    pub total_amount: f64,
    /// Display label for the quoting period, passed through as-is.
    pub period: String,
}

/// Externally computed sales projection, independent of the sales report.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionReport {
    pub accumulated_sales: f64,
    pub goal: f64,
    pub total_projected: f64,
    pub performance_pct: f64,
    /// Per-day projected amounts, positionally aligned with day 1 onward.
    pub projected_sales: Vec<f64>,
    /// When the projection was computed. Upstream does not commit to a
    /// format, so this is opaque display text; see
    /// [`projection_timestamp`](Self::projection_timestamp) for a typed view.
    pub projection_date: String,
}

fn amount(field: &str, raw: &RawScalar) -> Result<f64> {
    match raw.as_f64() {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(Error::schema(
            field,
            format!("expected a decimal amount, got {:?}", raw.display()),
        )),
    }
}

fn counter(field: &str, raw: &RawScalar) -> Result<u32> {
    match raw.as_f64() {
        Some(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => Ok(v as u32),
        _ => Err(Error::schema(
            field,
            format!("expected a non-negative integer, got {:?}", raw.display()),
        )),
    }
}

fn day_map(field: &str, raw: &BTreeMap<String, RawScalar>) -> Result<BTreeMap<u32, f64>> {
    let mut out = BTreeMap::new();
    for (key, value) in raw {
        let day: u32 = key.trim().parse().map_err(|_| {
            Error::schema(field, format!("day key {key:?} is not a day number"))
        })?;
        out.insert(day, amount(&format!("{field}[{day}]"), value)?);
    }
    Ok(out)
}

impl SalesReport {
    /// Validate a raw payload, failing fast on any unparseable field.
    pub fn from_wire(wire: SalesReportWire) -> Result<Self> {
        let cm = &wire.current_month;
        let daily_sales = day_map("current_month.daily_sales", &cm.daily_sales)?;
        let daily_goals = day_map("current_month.daily_goals", &cm.daily_goals)?;

        if daily_sales.keys().ne(daily_goals.keys()) {
            // Known upstream slack: goal rows can be missing for holiday days.
            // Consumers see goal 0 for those via goal_for().
            log::warn!(
                "daily_sales and daily_goals day sets differ ({} vs {} days)",
                daily_sales.len(),
                daily_goals.len()
            );
        }

        let current = CurrentMonth {
            accumulated_sales: amount("current_month.accumulated_sales", &cm.accumulated_sales)?,
            goal: amount("current_month.goal", &cm.goal)?,
            current_day: counter("current_month.current_day", &cm.current_day)?,
            days_in_month: counter("current_month.days_in_month", &cm.days_in_month)?,
            daily_sales,
            daily_goals,
            projected_sales: amount("current_month.projected_sales", &cm.projected_sales)?,
            daily_projection: amount("current_month.daily_projection", &cm.daily_projection)?,
        };

        let pm = &wire.previous_month;
        let previous = PreviousMonth {
            sales: amount("previous_month.sales", &pm.sales)?,
            goal: amount("previous_month.goal", &pm.goal)?,
            performance_pct: amount(
                "previous_month.performance_percentage",
                &pm.performance_percentage,
            )?,
        };

        let pq = &wire.pending_quotes;
        let pending_quotes = PendingQuotes {
            count: counter("pending_quotes.count", &pq.count)?,
            total_amount: amount("pending_quotes.total_amount", &pq.total_amount)?,
            period: pq.date.clone(),
        };

        let si = wire.seller_info;
        Ok(SalesReport {
            seller: SellerInfo {
                company_short: si.company_name_short,
                company_long: si.company_name_large.trim().to_string(),
                seller_name: si.seller_name,
                month_name: si.month_name,
                year: si.year.display(),
            },
            current,
            previous,
            pending_quotes,
        })
    }
}

impl ProjectionReport {
    pub fn from_wire(wire: ProjectionReportWire) -> Result<Self> {
        for (i, v) in wire.projected_sales.iter().enumerate() {
            if !v.is_finite() {
                return Err(Error::schema(
                    format!("projected_sales[{i}]"),
                    "expected a finite number",
                ));
            }
        }
        Ok(ProjectionReport {
            accumulated_sales: wire.accumulated_sales,
            goal: wire.goal,
            total_projected: wire.total_projected,
            performance_pct: wire.performance_percentage,
            projected_sales: wire.projected_sales,
            projection_date: wire.projection_date,
        })
    }

    /// The projection date as a typed timestamp, when the upstream string
    /// carries a recognizable format (RFC 3339 or `YYYY-MM-DD HH:MM:SS`,
    /// taken as UTC). `None` otherwise; an unrecognized format is not a
    /// validation failure.
    pub fn projection_timestamp(&self) -> Option<DateTime<Utc>> {
        let s = self.projection_date.trim();
        if let Ok(dt) = s.parse::<DateTime<Utc>>() {
            return Some(dt);
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sales_json() -> serde_json::Value {
        serde_json::json!({
            "seller_info": {
                "company_name_short": "ACME",
                "company_name_large": " ACME Distribuciones S.A.C. ",
                "seller_name": "J. Perez",
                "month_name": "Agosto",
                "year": 2026
            },
            "current_month": {
                "accumulated_sales": "8000.00",
                "goal": "10000.00",
                "current_day": "15",
                "days_in_month": 31,
                "daily_sales": { "1": "50.00", "2": "0", "3": "75.00" },
                "daily_goals": { "1": "100.00", "2": "100.00", "3": "60.00" },
                "projected_sales": "16500.00",
                "daily_projection": "532.26"
            },
            "previous_month": {
                "sales": "9500.00",
                "goal": "9000.00",
                "performance_percentage": "105.6"
            },
            "pending_quotes": {
                "count": 4,
                "total_amount": "2300.50",
                "date": "Agosto 2026"
            }
        })
    }

    #[test]
    fn test_sales_report_from_wire() {
        let wire: wire::SalesReportWire =
            serde_json::from_value(sample_sales_json()).unwrap();
        let report = SalesReport::from_wire(wire).unwrap();

        assert_eq!(report.seller.year, "2026");
        assert_eq!(report.seller.company_long, "ACME Distribuciones S.A.C.");
        assert_eq!(report.current.accumulated_sales, 8000.0);
        assert_eq!(report.current.current_day, 15);
        assert_eq!(report.current.days_in_month, 31);
        assert_eq!(report.current.daily_sales[&3], 75.0);
        assert_eq!(report.current.goal_for(3), 60.0);
        assert_eq!(report.current.goal_for(9), 0.0);
        assert_eq!(report.previous.performance_pct, 105.6);
        assert_eq!(report.pending_quotes.count, 4);
    }

    #[test]
    fn test_malformed_amount_is_a_schema_error() {
        let mut json = sample_sales_json();
        json["current_month"]["goal"] = serde_json::json!("not-a-number");
        let wire: wire::SalesReportWire = serde_json::from_value(json).unwrap();
        let err = SalesReport::from_wire(wire).unwrap_err();
        assert!(err.to_string().contains("current_month.goal"));
    }

    #[test]
    fn test_bad_day_key_is_a_schema_error() {
        let mut json = sample_sales_json();
        json["current_month"]["daily_sales"]["abc"] = serde_json::json!("5.00");
        let wire: wire::SalesReportWire = serde_json::from_value(json).unwrap();
        assert!(SalesReport::from_wire(wire).is_err());
    }

    fn projection_wire(projection_date: &str) -> ProjectionReportWire {
        ProjectionReportWire {
            accumulated_sales: 8000.0,
            goal: 10000.0,
            total_projected: 15000.0,
            performance_percentage: 75.0,
            projected_sales: vec![100.0, 200.0],
            projection_date: projection_date.into(),
        }
    }

    #[test]
    fn test_projection_date_is_opaque() {
        // The service does not commit to a timestamp format; any string
        // must pass validation.
        for raw in ["2026-08-15T13:45:00Z", "2026-08-15 13:45:00", "yesterday"] {
            let report = ProjectionReport::from_wire(projection_wire(raw)).unwrap();
            assert_eq!(report.projection_date, raw);
        }
    }

    #[test]
    fn test_projection_timestamp_parses_known_formats() {
        let report = ProjectionReport::from_wire(projection_wire("2026-08-15T13:45:00Z")).unwrap();
        assert_eq!(
            report.projection_timestamp().unwrap().to_rfc3339(),
            "2026-08-15T13:45:00+00:00"
        );

        let report = ProjectionReport::from_wire(projection_wire("2026-08-15 13:45:00")).unwrap();
        assert_eq!(
            report.projection_timestamp().unwrap().to_rfc3339(),
            "2026-08-15T13:45:00+00:00"
        );

        let report = ProjectionReport::from_wire(projection_wire("yesterday")).unwrap();
        assert_eq!(report.projection_timestamp(), None);
    }

    #[test]
    fn test_projection_rejects_non_finite() {
        let wire = ProjectionReportWire {
            accumulated_sales: 8000.0,
            goal: 10000.0,
            total_projected: 15000.0,
            performance_percentage: 75.0,
            projected_sales: vec![100.0, f64::NAN],
            projection_date: "2026-08-15T00:00:00Z".into(),
        };
        assert!(ProjectionReport::from_wire(wire).is_err());
    }
}
