//! Raw wire shapes for the two upstream services.
//!
//! The sales service is loose about scalar types: decimal amounts arrive as
//! strings ("8000.00") and day counters arrive as either strings or integers
//! depending on the backend revision. Everything here mirrors the JSON as-is;
//! [`crate::report`] converts to typed values and rejects malformed fields.

use std::collections::BTreeMap;

use serde::Deserialize;

/// A scalar that may arrive as a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
    Num(f64),
    Text(String),
}

impl RawScalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawScalar::Num(n) => Some(*n),
            RawScalar::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn display(&self) -> String {
        match self {
            RawScalar::Num(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            RawScalar::Text(s) => s.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SalesReportWire {
    pub seller_info: SellerInfoWire,
    pub current_month: CurrentMonthWire,
    pub previous_month: PreviousMonthWire,
    pub pending_quotes: PendingQuotesWire,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SellerInfoWire {
    pub company_name_short: String,
    pub company_name_large: String,
    pub seller_name: String,
    pub month_name: String,
    pub year: RawScalar,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentMonthWire {
    pub accumulated_sales: RawScalar,
    pub goal: RawScalar,
    pub current_day: RawScalar,
    pub days_in_month: RawScalar,
    pub daily_sales: BTreeMap<String, RawScalar>,
    pub daily_goals: BTreeMap<String, RawScalar>,
    pub projected_sales: RawScalar,
    pub daily_projection: RawScalar,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviousMonthWire {
    pub sales: RawScalar,
    pub goal: RawScalar,
    pub performance_percentage: RawScalar,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PendingQuotesWire {
    pub count: RawScalar,
    pub total_amount: RawScalar,
    pub date: String,
}

/// The projection service already speaks plain JSON numbers.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionReportWire {
    pub accumulated_sales: f64,
    pub goal: f64,
    pub total_projected: f64,
    pub performance_percentage: f64,
    pub projected_sales: Vec<f64>,
    pub projection_date: String,
}
