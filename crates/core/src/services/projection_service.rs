use std::cmp::Ordering;

use crate::models::portfolio::PortfolioItem;
use crate::models::view_state::{SortDirection, SortField, ViewState};

/// Filters and orders the portfolio table. Never touches the snapshot:
/// the result borrows the items it selected.
pub struct ProjectionService;

impl ProjectionService {
    pub fn new() -> Self {
        Self
    }

    /// Keep items whose ticker contains `search_term` (case-insensitive),
    /// then sort them by `sort_field` in `direction`.
    ///
    /// With no sort field the fetch order is kept. The sort is stable, so
    /// items with equal keys stay in their original relative order in both
    /// directions.
    pub fn project<'a>(
        &self,
        items: &'a [PortfolioItem],
        search_term: &str,
        sort_field: Option<SortField>,
        direction: SortDirection,
    ) -> Vec<&'a PortfolioItem> {
        let needle = search_term.to_lowercase();
        let mut rows: Vec<&PortfolioItem> = items
            .iter()
            .filter(|item| needle.is_empty() || item.ticker.to_lowercase().contains(&needle))
            .collect();

        if let Some(field) = sort_field {
            // Vec::sort_by is stable
            rows.sort_by(|a, b| {
                let ord = compare_by(field, a, b);
                match direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }

        rows
    }

    /// Project using the filter and sort held in a view state.
    pub fn project_view<'a>(&self, items: &'a [PortfolioItem], view: &ViewState) -> Vec<&'a PortfolioItem> {
        self.project(items, &view.search_term, view.sort_field, view.sort_direction)
    }
}

impl Default for ProjectionService {
    fn default() -> Self {
        Self::new()
    }
}

fn compare_by(field: SortField, a: &PortfolioItem, b: &PortfolioItem) -> Ordering {
    match field {
        SortField::Ticker => a.ticker.to_lowercase().cmp(&b.ticker.to_lowercase()),
        SortField::Quantity => a.quantity.total_cmp(&b.quantity),
        SortField::TotalInvested => a.total_invested.total_cmp(&b.total_invested),
        SortField::AveragePrice => a.average_price.total_cmp(&b.average_price),
        SortField::InternalRateOfReturn => {
            a.internal_rate_of_return.total_cmp(&b.internal_rate_of_return)
        }
        SortField::Dividends => a.dividends.total_cmp(&b.dividends),
        SortField::InterestOnEquity => a.interest_on_equity.total_cmp(&b.interest_on_equity),
    }
}
