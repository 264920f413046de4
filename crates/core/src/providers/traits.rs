use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::portfolio::PortfolioItemRecord;
use crate::models::tax::TaxReport;

/// Where portfolio data comes from.
///
/// The HTTP backend implements this; tests plug in canned or failing
/// sources without touching the services.
#[async_trait]
pub trait PortfolioSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the raw portfolio rows. One request, no retry.
    async fn fetch_portfolio(&self, endpoint: &str) -> Result<Vec<PortfolioItemRecord>, CoreError>;

    /// Fetch the yearly tax report. One request, no retry.
    async fn fetch_tax_report(&self, endpoint: &str) -> Result<TaxReport, CoreError>;
}
