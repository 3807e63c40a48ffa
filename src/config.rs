use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_COMPANY: &str = "10";
pub const DEFAULT_SELLER_CODE: &str = "000070";

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_STALE_AFTER_SECS: u64 = 5 * 60;
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Endpoint and policy configuration for the dashboard client.
///
/// URLs have no built-in defaults: they come from explicit arguments or the
/// `SALESDASH_SALES_URL` / `SALESDASH_PROJECTION_URL` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub sales_url: String,
    pub projection_url: String,
    /// Per-request timeout. Retry attempts each get the full timeout.
    pub timeout: Duration,
    /// How long a cached report is considered fresh.
    pub stale_after: Duration,
    /// Retries after the initial attempt fails.
    pub max_retries: u32,
}

impl Config {
    pub fn new(sales_url: impl Into<String>, projection_url: impl Into<String>) -> Self {
        Self {
            sales_url: sales_url.into(),
            projection_url: projection_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            stale_after: Duration::from_secs(DEFAULT_STALE_AFTER_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Build a config from `SALESDASH_SALES_URL` and `SALESDASH_PROJECTION_URL`.
    pub fn from_env() -> Result<Self> {
        let sales_url = env::var("SALESDASH_SALES_URL")
            .map_err(|_| Error::Config("SALESDASH_SALES_URL is not set".into()))?;
        let projection_url = env::var("SALESDASH_PROJECTION_URL")
            .map_err(|_| Error::Config("SALESDASH_PROJECTION_URL is not set".into()))?;
        Ok(Self::new(sales_url, projection_url))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// The `(company, seller_code)` pair selecting whose data to fetch.
///
/// Both components must be non-empty before any request is issued; an empty
/// component is an input-validation failure, not a fetch error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SellerKey {
    company: String,
    seller_code: String,
}

impl SellerKey {
    pub fn new(company: impl Into<String>, seller_code: impl Into<String>) -> Result<Self> {
        let company = company.into();
        let seller_code = seller_code.into();
        if company.trim().is_empty() {
            return Err(Error::InvalidKey("company must not be empty".into()));
        }
        if seller_code.trim().is_empty() {
            return Err(Error::InvalidKey("seller_code must not be empty".into()));
        }
        Ok(Self {
            company,
            seller_code,
        })
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn seller_code(&self) -> &str {
        &self.seller_code
    }
}

impl std::fmt::Display for SellerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.company, self.seller_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seller_key_rejects_empty_components() {
        assert!(SellerKey::new("", "000070").is_err());
        assert!(SellerKey::new("10", "").is_err());
        assert!(SellerKey::new("  ", "000070").is_err());
        assert!(SellerKey::new("10", "000070").is_ok());
    }

    #[test]
    fn test_seller_key_display() {
        let key = SellerKey::new("10", "000070").unwrap();
        assert_eq!(key.to_string(), "10:000070");
    }
}
