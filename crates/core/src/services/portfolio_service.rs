use tracing::{info, warn};

use crate::errors::CoreError;
use crate::models::portfolio::PortfolioSnapshot;
use crate::models::tax::TaxReport;
use crate::providers::traits::PortfolioSource;
use crate::services::tax_service::TaxService;

/// Fetch-and-normalize step: one request, a strict decode, validation.
///
/// No retry and no caching; each call is a single attempt.
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Fetch the portfolio and turn it into a validated snapshot.
    ///
    /// An empty array is a valid, empty snapshot, not an error.
    pub async fn load_portfolio(
        &self,
        source: &dyn PortfolioSource,
        endpoint: &str,
    ) -> Result<PortfolioSnapshot, CoreError> {
        let result = match source.fetch_portfolio(endpoint).await {
            Ok(records) => PortfolioSnapshot::from_records(records),
            Err(e) => Err(e),
        };

        match &result {
            Ok(snapshot) => info!(
                source = source.name(),
                items = snapshot.len(),
                "portfolio loaded"
            ),
            Err(e) => warn!(source = source.name(), error = %e, "portfolio load failed"),
        }
        result
    }

    /// Fetch the yearly tax report and check it against the supported contract.
    pub async fn load_tax_report(
        &self,
        source: &dyn PortfolioSource,
        tax_service: &TaxService,
        endpoint: &str,
    ) -> Result<TaxReport, CoreError> {
        let result = match source.fetch_tax_report(endpoint).await {
            Ok(report) => tax_service.validate_report(&report).map(|_| report),
            Err(e) => Err(e),
        };

        match &result {
            Ok(report) => info!(
                source = source.name(),
                year = report.reference_year,
                items = report.items.len(),
                "tax report loaded"
            ),
            Err(e) => warn!(source = source.name(), error = %e, "tax report load failed"),
        }
        result
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}
