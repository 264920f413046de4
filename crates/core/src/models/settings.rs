use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::CoreError;

const DEFAULT_PORTFOLIO_ENDPOINT: &str = "http://localhost:8000/carteira";
const DEFAULT_TAX_REPORT_ENDPOINT: &str = "http://localhost:8000/relatorio-ir";

/// Runtime configuration. Endpoints are never hard-coded in the views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// URL returning the portfolio array
    pub portfolio_endpoint: String,

    /// URL returning the yearly tax report
    pub tax_report_endpoint: String,

    /// HTTP request timeout, in seconds
    pub request_timeout_secs: u64,

    /// How long the "copied" indicator stays on, in milliseconds
    pub copy_flash_ms: u64,

    /// Broker named in the asset discrimination text
    pub broker_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            portfolio_endpoint: DEFAULT_PORTFOLIO_ENDPOINT.to_string(),
            tax_report_endpoint: DEFAULT_TAX_REPORT_ENDPOINT.to_string(),
            request_timeout_secs: 30,
            copy_flash_ms: 2000,
            broker_name: "X".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the environment (and a `.env` file, if present).
    ///
    /// Unset or unparsable numeric variables keep their defaults.
    pub fn from_env() -> Result<Self, CoreError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse_u64 = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        let settings = Self {
            portfolio_endpoint: lookup("PORTFOLIO_ENDPOINT")
                .unwrap_or(defaults.portfolio_endpoint),
            tax_report_endpoint: lookup("TAX_REPORT_ENDPOINT")
                .unwrap_or(defaults.tax_report_endpoint),
            request_timeout_secs: parse_u64("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            copy_flash_ms: parse_u64("COPY_FLASH_MS", defaults.copy_flash_ms),
            broker_name: lookup("BROKER_NAME").unwrap_or(defaults.broker_name),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check that both endpoints are absolute http(s) URLs.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, url) in [
            ("PORTFOLIO_ENDPOINT", &self.portfolio_endpoint),
            ("TAX_REPORT_ENDPOINT", &self.tax_report_endpoint),
        ] {
            let url = url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CoreError::Config(format!(
                    "{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "REQUEST_TIMEOUT_SECS must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn copy_flash(&self) -> Duration {
        Duration::from_millis(self.copy_flash_ms)
    }
}
