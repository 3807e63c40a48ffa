//! HTTP fetch layer for the two upstream services.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::{Config, SellerKey};
use crate::error::{Error, Result};
use crate::report::wire::{ProjectionReportWire, SalesReportWire};
use crate::report::{ProjectionReport, SalesReport};

const BACKOFF_SECONDS: &[u64] = &[1, 2, 4];

/// Read-only client for the sales and projection services.
pub struct ApiClient {
    http: reqwest::Client,
    config: Config,
}

impl ApiClient {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("salesdash/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `GET <sales_url>?company=..&seller_code=..`, validated at the boundary.
    pub async fn sales_report(&self, key: &SellerKey) -> Result<SalesReport> {
        let wire: SalesReportWire = self
            .get_json("sales service", &self.config.sales_url, key)
            .await?;
        SalesReport::from_wire(wire)
    }

    /// `GET <projection_url>?company=..&seller_code=..`.
    pub async fn projection_report(&self, key: &SellerKey) -> Result<ProjectionReport> {
        let wire: ProjectionReportWire = self
            .get_json("projection service", &self.config.projection_url, key)
            .await?;
        ProjectionReport::from_wire(wire)
    }

    /// GET with retries. Transport errors and non-2xx statuses are retried
    /// up to `max_retries` times with short exponential backoff; a body that
    /// fails to decode is surfaced immediately.
    async fn get_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        url: &str,
        key: &SellerKey,
    ) -> Result<T> {
        let mut attempt: u32 = 0;
        loop {
            match self.get_json_once(service, url, key).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.config.max_retries && is_retryable(&e) => {
                    let wait = BACKOFF_SECONDS
                        .get(attempt as usize)
                        .copied()
                        .unwrap_or(*BACKOFF_SECONDS.last().unwrap_or(&4));
                    log::warn!(
                        "{service} request failed ({e}). Waiting {wait}s before retry {}/{}",
                        attempt + 1,
                        self.config.max_retries
                    );
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        service: &'static str,
        url: &str,
        key: &SellerKey,
    ) -> Result<T> {
        log::debug!("fetching {service} for {key} from {url}");
        let response = self
            .http
            .get(url)
            .query(&[
                ("company", key.company()),
                ("seller_code", key.seller_code()),
            ])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                service,
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| Error::Decode {
            service,
            message: e.to_string(),
        })
    }
}

fn is_retryable(e: &Error) -> bool {
    matches!(e, Error::Http(_) | Error::Status { .. })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(is_retryable(&Error::Status {
            service: "sales service",
            status: 503
        }));
        assert!(!is_retryable(&Error::Decode {
            service: "sales service",
            message: "expected value".into()
        }));
        assert!(!is_retryable(&Error::schema("current_month.goal", "bad")));
    }
}
