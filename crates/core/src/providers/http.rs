use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::portfolio::PortfolioItemRecord;
use crate::models::tax::TaxReport;
use super::traits::PortfolioSource;

/// Backend API reached over HTTP(S).
///
/// - `GET <portfolio-endpoint>` returns a JSON array of positions.
/// - `GET <tax-report-endpoint>` returns the yearly IRPF report object.
///
/// Non-success statuses are errors; the body is decoded strictly.
pub struct HttpPortfolioSource {
    client: Client,
}

impl HttpPortfolioSource {
    pub fn new() -> Self {
        Self::with_timeout_secs(30)
    }

    /// Build a source whose requests give up after `secs` seconds.
    pub fn with_timeout_secs(secs: u64) -> Self {
        let builder = Client::builder().timeout(Duration::from_secs(secs));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, CoreError> {
        debug!(endpoint, "requesting");
        let resp = self.client.get(endpoint).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::HttpStatus {
                endpoint: redact_query(endpoint),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            CoreError::Parse(format!(
                "Unexpected response body from {}: {e}",
                redact_query(endpoint)
            ))
        })
    }
}

impl Default for HttpPortfolioSource {
    fn default() -> Self {
        Self::new()
    }
}

fn redact_query(endpoint: &str) -> String {
    match endpoint.split_once('?') {
        Some((base, _)) => format!("{base}?<query redacted>"),
        None => endpoint.to_string(),
    }
}

#[async_trait]
impl PortfolioSource for HttpPortfolioSource {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn fetch_portfolio(&self, endpoint: &str) -> Result<Vec<PortfolioItemRecord>, CoreError> {
        self.get_json(endpoint).await
    }

    async fn fetch_tax_report(&self, endpoint: &str) -> Result<TaxReport, CoreError> {
        self.get_json(endpoint).await
    }
}
