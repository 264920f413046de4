use serde::Serialize;

/// Summary figures derived from a snapshot. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedTotals {
    /// Sum of every item's cost basis
    pub total_invested: f64,

    /// Sum of dividends received
    pub total_dividends: f64,

    /// Sum of interest on equity (JCP) received
    pub total_interest_on_equity: f64,

    /// Distributions received: dividends + JCP
    pub total_return: f64,

    /// Investment-weighted average IRR, in percent.
    ///
    /// `None` when nothing is invested (empty snapshot or all-zero cost
    /// basis), since the weights are undefined.
    pub weighted_rate: Option<f64>,
}

impl DerivedTotals {
    /// Totals of an empty snapshot.
    pub const fn empty() -> Self {
        Self {
            total_invested: 0.0,
            total_dividends: 0.0,
            total_interest_on_equity: 0.0,
            total_return: 0.0,
            weighted_rate: None,
        }
    }
}

impl Default for DerivedTotals {
    fn default() -> Self {
        Self::empty()
    }
}

/// One slice of the allocation pie chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationSlice {
    pub ticker: String,

    /// Amount invested in this ticker
    pub value: f64,

    /// Share of total invested, 0..=100. Zero when nothing is invested.
    pub percentage: f64,
}

/// One stacked bar of the distributions chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionBar {
    pub ticker: String,
    pub dividends: f64,
    pub interest_on_equity: f64,
    /// dividends + interest_on_equity
    pub total: f64,
}

/// Everything the summary cards and charts need, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub totals: DerivedTotals,
    pub positions: usize,
    pub allocation: Vec<AllocationSlice>,
    pub distributions: Vec<DistributionBar>,
}
