pub mod clipboard;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod tax_report;

use std::sync::Arc;
use tracing::{debug, warn};

use errors::CoreError;
use models::{
    analytics::DashboardSummary,
    load_state::{LoadState, LoadTicket, RefreshGuard},
    portfolio::{PortfolioItem, PortfolioSnapshot},
    settings::Settings,
    view_state::{SortField, ViewState},
};
use providers::{http::HttpPortfolioSource, traits::PortfolioSource};
use services::{
    analytics_service::AnalyticsService, portfolio_service::PortfolioService,
    projection_service::ProjectionService,
};

pub use tax_report::TaxReportPage;

/// Main entry point: the portfolio dashboard view model.
///
/// Owns the fetched snapshot, the derived summary and the table's view
/// state. All mutation goes through its own methods; nothing is shared with
/// other views.
#[must_use]
pub struct PortfolioDashboard {
    settings: Settings,
    source: Arc<dyn PortfolioSource>,
    analytics_service: AnalyticsService,
    projection_service: ProjectionService,
    state: LoadState<PortfolioSnapshot>,
    /// Recomputed only when the snapshot is replaced
    summary: Option<DashboardSummary>,
    view: ViewState,
    guard: RefreshGuard,
}

impl std::fmt::Debug for PortfolioDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioDashboard")
            .field("source", &self.source.name())
            .field("endpoint", &self.settings.portfolio_endpoint)
            .field("items", &self.state.data().map(|s| s.len()))
            .field("view", &self.view)
            .field("mounted", &self.guard.is_mounted())
            .finish()
    }
}

/// A portfolio request detached from the view, so the view stays usable
/// while it is outstanding.
pub struct PortfolioFetch {
    source: Arc<dyn PortfolioSource>,
    endpoint: String,
}

impl PortfolioFetch {
    pub async fn run(self) -> Result<PortfolioSnapshot, CoreError> {
        PortfolioService::new()
            .load_portfolio(self.source.as_ref(), &self.endpoint)
            .await
    }
}

impl PortfolioDashboard {
    /// Create a dashboard reading from `source`. Nothing is fetched yet.
    pub fn new(settings: Settings, source: Arc<dyn PortfolioSource>) -> Self {
        Self {
            settings,
            source,
            analytics_service: AnalyticsService::new(),
            projection_service: ProjectionService::new(),
            state: LoadState::Pending,
            summary: None,
            view: ViewState::default(),
            guard: RefreshGuard::new(),
        }
    }

    /// Create a dashboard backed by the HTTP API named in `settings`.
    pub fn from_settings(settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        let source = HttpPortfolioSource::with_timeout_secs(settings.request_timeout_secs);
        Ok(Self::new(settings, Arc::new(source)))
    }

    // ── Loading ─────────────────────────────────────────────────────

    /// Mark the view as loading and hand out the ticket for this attempt.
    /// Any earlier outstanding attempt is superseded.
    pub fn begin_refresh(&mut self) -> LoadTicket {
        let ticket = self.guard.begin();
        self.state = LoadState::Pending;
        self.summary = None;
        debug!(endpoint = %self.settings.portfolio_endpoint, "portfolio refresh started");
        ticket
    }

    /// The request for the current endpoint, independent of `self`.
    pub fn fetch(&self) -> PortfolioFetch {
        PortfolioFetch {
            source: Arc::clone(&self.source),
            endpoint: self.settings.portfolio_endpoint.clone(),
        }
    }

    /// Apply a finished fetch. Returns `false` (and changes nothing) when the
    /// view was unmounted or a newer refresh has started since `ticket`.
    pub fn complete_refresh(
        &mut self,
        ticket: LoadTicket,
        result: Result<PortfolioSnapshot, CoreError>,
    ) -> bool {
        if !self.guard.accepts(ticket) {
            warn!("dropping stale portfolio result");
            return false;
        }

        match result {
            Ok(snapshot) if snapshot.is_empty() => {
                self.summary = None;
                self.state = LoadState::Empty;
            }
            Ok(snapshot) => {
                self.summary = Some(self.analytics_service.summarize(&snapshot));
                self.state = LoadState::Ready(Arc::new(snapshot));
            }
            Err(e) => {
                self.summary = None;
                self.state = LoadState::Failed(e.user_message());
            }
        }
        true
    }

    /// Fetch and apply in one step. A single attempt; call again to retry.
    pub async fn refresh(&mut self) -> bool {
        let ticket = self.begin_refresh();
        let result = self.fetch().run().await;
        self.complete_refresh(ticket, result)
    }

    /// The view is going away: results still in flight will be ignored.
    pub fn unmount(&mut self) {
        self.guard.unmount();
    }

    // ── Reading ─────────────────────────────────────────────────────

    pub fn state(&self) -> &LoadState<PortfolioSnapshot> {
        &self.state
    }

    /// Cards and charts; `None` unless data is loaded.
    pub fn summary(&self) -> Option<&DashboardSummary> {
        self.summary.as_ref()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Table rows for the current search and sort. Empty unless data is loaded.
    pub fn rows(&self) -> Vec<&PortfolioItem> {
        match self.state.data() {
            Some(snapshot) => self
                .projection_service
                .project_view(snapshot.items(), &self.view),
            None => Vec::new(),
        }
    }

    // ── User actions ────────────────────────────────────────────────

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.view = self.view.with_search_term(term);
    }

    /// Column header click.
    pub fn toggle_sort(&mut self, field: SortField) {
        self.view = self.view.toggle_sort(field);
    }

    pub fn clear_sort(&mut self) {
        self.view = self.view.clear_sort();
    }

    pub fn toggle_expanded(&mut self, ticker: &str) {
        self.view = self.view.toggle_expanded(ticker);
    }

    /// Replace the whole view state at once.
    pub fn set_view(&mut self, view: ViewState) {
        self.view = view;
    }
}
