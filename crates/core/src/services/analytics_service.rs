use crate::models::analytics::{AllocationSlice, DashboardSummary, DerivedTotals, DistributionBar};
use crate::models::portfolio::{PortfolioItem, PortfolioSnapshot};

/// Derives the dashboard KPIs and chart series from a snapshot.
///
/// Pure business logic: no I/O, results depend only on the items passed in,
/// in any order.
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    /// Sum invested, dividends and JCP, and the investment-weighted IRR.
    ///
    /// The weighted rate is Σ(rate × invested) / Σ(invested). When nothing
    /// is invested the weights are undefined and `weighted_rate` is `None`.
    pub fn compute_totals(&self, items: &[PortfolioItem]) -> DerivedTotals {
        let mut total_invested = 0.0;
        let mut total_dividends = 0.0;
        let mut total_interest_on_equity = 0.0;
        let mut weighted_sum = 0.0;

        for item in items {
            total_invested += item.total_invested;
            total_dividends += item.dividends;
            total_interest_on_equity += item.interest_on_equity;
            weighted_sum += item.internal_rate_of_return * item.total_invested;
        }

        let weighted_rate = if total_invested > 0.0 {
            Some(weighted_sum / total_invested)
        } else {
            None
        };

        DerivedTotals {
            total_invested,
            total_dividends,
            total_interest_on_equity,
            total_return: total_dividends + total_interest_on_equity,
            weighted_rate,
        }
    }

    /// Allocation pie: each ticker's share of total invested, in fetch order.
    pub fn allocation(&self, items: &[PortfolioItem], totals: &DerivedTotals) -> Vec<AllocationSlice> {
        items
            .iter()
            .map(|item| AllocationSlice {
                ticker: item.ticker.clone(),
                value: item.total_invested,
                percentage: if totals.total_invested > 0.0 {
                    (item.total_invested / totals.total_invested) * 100.0
                } else {
                    0.0
                },
            })
            .collect()
    }

    /// Stacked dividends + JCP bars, in fetch order.
    pub fn distribution_bars(&self, items: &[PortfolioItem]) -> Vec<DistributionBar> {
        items
            .iter()
            .map(|item| DistributionBar {
                ticker: item.ticker.clone(),
                dividends: item.dividends,
                interest_on_equity: item.interest_on_equity,
                total: item.dividends + item.interest_on_equity,
            })
            .collect()
    }

    /// Cards and charts for a snapshot, in one call.
    pub fn summarize(&self, snapshot: &PortfolioSnapshot) -> DashboardSummary {
        let items = snapshot.items();
        let totals = self.compute_totals(items);
        DashboardSummary {
            allocation: self.allocation(items, &totals),
            distributions: self.distribution_bars(items),
            positions: items.len(),
            totals,
        }
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}
