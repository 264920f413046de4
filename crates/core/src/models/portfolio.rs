use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// One row of the portfolio: a traded instrument and its pre-aggregated figures.
///
/// All values are computed by the backend; this crate only validates and
/// displays them. Monetary values are in BRL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioItem {
    /// Ticker symbol (e.g., "PETR4"), unique within a snapshot
    pub ticker: String,

    /// Units held at snapshot time
    pub quantity: f64,

    /// Average acquisition price per unit
    pub average_price: f64,

    /// Running cost basis
    pub total_invested: f64,

    /// Internal rate of return, in percent. May be negative.
    pub internal_rate_of_return: f64,

    /// Cumulative dividends received
    pub dividends: f64,

    /// Cumulative interest on equity (JCP) received
    pub interest_on_equity: f64,
}

/// Wire shape of a portfolio row.
///
/// The endpoint has shipped more than one naming scheme; every known alias
/// is accepted here and nowhere else.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioItemRecord {
    #[serde(alias = "Ticker")]
    pub ticker: String,

    #[serde(alias = "quantidade")]
    pub quantity: f64,

    #[serde(alias = "preco_medio")]
    pub average_price: f64,

    #[serde(alias = "total_investido")]
    pub total_invested: f64,

    #[serde(alias = "TIR", alias = "tir")]
    pub internal_rate_of_return: f64,

    #[serde(alias = "dividendos", default)]
    pub dividends: f64,

    #[serde(alias = "juros_sobre_capital_proprio", alias = "jcp", default)]
    pub interest_on_equity: f64,
}

impl TryFrom<PortfolioItemRecord> for PortfolioItem {
    type Error = CoreError;

    fn try_from(record: PortfolioItemRecord) -> Result<Self, Self::Error> {
        let ticker = record.ticker.trim().to_string();
        if ticker.is_empty() {
            return Err(CoreError::Validation {
                ticker: "<empty>".into(),
                field: "ticker",
                reason: "ticker must not be empty".into(),
            });
        }

        for (field, value) in [
            ("quantity", record.quantity),
            ("average_price", record.average_price),
            ("total_invested", record.total_invested),
            ("dividends", record.dividends),
            ("interest_on_equity", record.interest_on_equity),
        ] {
            ensure_non_negative(&ticker, field, value)?;
        }
        if !record.internal_rate_of_return.is_finite() {
            return Err(CoreError::Validation {
                ticker,
                field: "internal_rate_of_return",
                reason: "must be a finite number".into(),
            });
        }

        Ok(Self {
            ticker,
            quantity: record.quantity,
            average_price: record.average_price,
            total_invested: record.total_invested,
            internal_rate_of_return: record.internal_rate_of_return,
            dividends: record.dividends,
            interest_on_equity: record.interest_on_equity,
        })
    }
}

pub(crate) fn ensure_non_negative(ticker: &str, field: &'static str, value: f64) -> Result<(), CoreError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::Validation {
            ticker: ticker.to_string(),
            field,
            reason: format!("expected a non-negative number, got {value}"),
        })
    }
}

/// An immutable, fully validated portfolio fetched in one request.
///
/// Replaced wholesale on refresh; there is no way to patch it in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSnapshot {
    items: Vec<PortfolioItem>,
    fetched_at: DateTime<Utc>,
}

impl PortfolioSnapshot {
    /// Validate decoded records and build a snapshot.
    /// Fails on the first invalid record or on a duplicated ticker.
    pub fn from_records(records: Vec<PortfolioItemRecord>) -> Result<Self, CoreError> {
        let mut items: Vec<PortfolioItem> = Vec::with_capacity(records.len());
        for record in records {
            let item = PortfolioItem::try_from(record)?;
            if items.iter().any(|i| i.ticker == item.ticker) {
                return Err(CoreError::Validation {
                    ticker: item.ticker,
                    field: "ticker",
                    reason: "duplicated ticker in snapshot".into(),
                });
            }
            items.push(item);
        }
        Ok(Self::new(items))
    }

    /// Build a snapshot from already-validated items, stamped with the current time.
    pub fn new(items: Vec<PortfolioItem>) -> Self {
        Self {
            items,
            fetched_at: Utc::now(),
        }
    }

    /// Items in fetch order.
    pub fn items(&self) -> &[PortfolioItem] {
        &self.items
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by ticker (case-insensitive).
    pub fn find(&self, ticker: &str) -> Option<&PortfolioItem> {
        self.items
            .iter()
            .find(|i| i.ticker.eq_ignore_ascii_case(ticker))
    }
}
