use serde::{Deserialize, Serialize};

/// Column the portfolio table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortField {
    Ticker,
    Quantity,
    TotalInvested,
    AveragePrice,
    InternalRateOfReturn,
    Dividends,
    InterestOnEquity,
}

impl SortField {
    pub const ALL: [SortField; 7] = [
        SortField::Ticker,
        SortField::Quantity,
        SortField::TotalInvested,
        SortField::AveragePrice,
        SortField::InternalRateOfReturn,
        SortField::Dividends,
        SortField::InterestOnEquity,
    ];

    /// Column header label.
    pub fn label(&self) -> &'static str {
        match self {
            SortField::Ticker => "Ticker",
            SortField::Quantity => "Quantidade",
            SortField::TotalInvested => "Total Investido",
            SortField::AveragePrice => "Preço Médio",
            SortField::InternalRateOfReturn => "TIR",
            SortField::Dividends => "Dividendos",
            SortField::InterestOnEquity => "JCP",
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// All user-controlled table state, as a single value.
///
/// Every user action produces a new `ViewState`; the view swaps it in
/// whole, so filter, sort and expansion can never disagree with each other.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewState {
    pub search_term: String,
    pub sort_field: Option<SortField>,
    pub sort_direction: SortDirection,
    /// Ticker whose drill-down is open, if any. At most one at a time.
    pub expanded_ticker: Option<String>,
}

impl ViewState {
    pub fn with_search_term(&self, term: impl Into<String>) -> Self {
        Self {
            search_term: term.into(),
            ..self.clone()
        }
    }

    /// Clicking a column header: the active column flips direction,
    /// any other column becomes active in ascending order.
    pub fn toggle_sort(&self, field: SortField) -> Self {
        let (sort_field, sort_direction) = if self.sort_field == Some(field) {
            (Some(field), self.sort_direction.flipped())
        } else {
            (Some(field), SortDirection::Ascending)
        };
        Self {
            sort_field,
            sort_direction,
            ..self.clone()
        }
    }

    /// Back to fetch order.
    pub fn clear_sort(&self) -> Self {
        Self {
            sort_field: None,
            sort_direction: SortDirection::Ascending,
            ..self.clone()
        }
    }

    /// Expanding a ticker collapses any other; toggling the open one closes it.
    pub fn toggle_expanded(&self, ticker: &str) -> Self {
        let expanded_ticker = match &self.expanded_ticker {
            Some(open) if open == ticker => None,
            _ => Some(ticker.to_string()),
        };
        Self {
            expanded_ticker,
            ..self.clone()
        }
    }

    pub fn is_expanded(&self, ticker: &str) -> bool {
        self.expanded_ticker.as_deref() == Some(ticker)
    }
}
