pub mod cache;
pub mod chart;
pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod report;

pub use chart::{daily_series, projection_series, ChartDayRecord, ProjectionDayRecord};
pub use client::ApiClient;
pub use config::{Config, SellerKey, DEFAULT_COMPANY, DEFAULT_SELLER_CODE};
pub use error::{Error, Result};
pub use metrics::{BestDay, DerivedMetrics, WeeklyGoalTiers};
pub use report::{ProjectionReport, SalesReport};

use std::sync::Arc;

use cache::ReportCache;

/// Main entry point for the sales dashboard client.
///
/// Owns the HTTP client and one cache per report type. Reports are cached
/// per [`SellerKey`]: fresh entries are served directly, stale entries are
/// served while a background refresh runs, and concurrent requests for the
/// same key share a single in-flight fetch.
pub struct SalesDash {
    client: Arc<ApiClient>,
    sales_cache: Arc<ReportCache<SalesReport>>,
    projection_cache: Arc<ReportCache<ProjectionReport>>,
}

/// Both dashboard sections, fetched independently. One section failing
/// leaves the other usable.
pub struct Dashboard {
    pub sales: Result<SalesReport>,
    pub projection: Result<ProjectionReport>,
}

impl SalesDash {
    pub fn new(config: Config) -> Result<Self> {
        let stale_after = config.stale_after;
        Ok(Self {
            client: Arc::new(ApiClient::new(config)?),
            sales_cache: Arc::new(ReportCache::new(stale_after)),
            projection_cache: Arc::new(ReportCache::new(stale_after)),
        })
    }

    /// The seller's monthly sales report, via the cache.
    pub async fn sales_report(&self, key: &SellerKey) -> Result<SalesReport> {
        let client = Arc::clone(&self.client);
        let k = key.clone();
        cache::fetch_through(&self.sales_cache, key, move || async move {
            client.sales_report(&k).await
        })
        .await
    }

    /// The externally computed projection, via the cache.
    pub async fn projection_report(&self, key: &SellerKey) -> Result<ProjectionReport> {
        let client = Arc::clone(&self.client);
        let k = key.clone();
        cache::fetch_through(&self.projection_cache, key, move || async move {
            client.projection_report(&k).await
        })
        .await
    }

    /// Fetch both reports concurrently. There is no ordering dependency
    /// between them; each side carries its own result.
    pub async fn dashboard(&self, key: &SellerKey) -> Dashboard {
        let (sales, projection) =
            tokio::join!(self.sales_report(key), self.projection_report(key));
        Dashboard { sales, projection }
    }
}
