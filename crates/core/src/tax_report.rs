use std::sync::Arc;
use tracing::{debug, warn};

use crate::clipboard::CopyFlash;
use crate::errors::CoreError;
use crate::models::load_state::{LoadState, LoadTicket, RefreshGuard};
use crate::models::settings::Settings;
use crate::models::tax::{TaxReport, TaxSection, TaxView};
use crate::models::view_state::ViewState;
use crate::providers::http::HttpPortfolioSource;
use crate::providers::traits::PortfolioSource;
use crate::services::format::copy_value;
use crate::services::portfolio_service::PortfolioService;
use crate::services::tax_service::TaxService;

/// View model of the IRPF helper page.
///
/// Loads the yearly report, exposes it grouped by declaration section, and
/// tracks which section is open, which ticker's drill-down is expanded and
/// which value was just copied.
#[must_use]
pub struct TaxReportPage {
    settings: Settings,
    source: Arc<dyn PortfolioSource>,
    tax_service: Arc<TaxService>,
    state: LoadState<TaxView>,
    section: TaxSection,
    view: ViewState,
    copied: CopyFlash,
    guard: RefreshGuard,
}

impl std::fmt::Debug for TaxReportPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaxReportPage")
            .field("source", &self.source.name())
            .field("endpoint", &self.settings.tax_report_endpoint)
            .field("year", &self.state.data().map(|v| v.reference_year))
            .field("section", &self.section)
            .field("expanded", &self.view.expanded_ticker)
            .finish()
    }
}

/// A tax-report request detached from the page.
pub struct TaxReportFetch {
    source: Arc<dyn PortfolioSource>,
    tax_service: Arc<TaxService>,
    endpoint: String,
}

impl TaxReportFetch {
    pub async fn run(self) -> Result<TaxReport, CoreError> {
        PortfolioService::new()
            .load_tax_report(self.source.as_ref(), &self.tax_service, &self.endpoint)
            .await
    }
}

impl TaxReportPage {
    pub fn new(settings: Settings, source: Arc<dyn PortfolioSource>) -> Self {
        let tax_service = Arc::new(TaxService::new(settings.broker_name.clone()));
        let copied = CopyFlash::new(settings.copy_flash());
        Self {
            settings,
            source,
            tax_service,
            state: LoadState::Pending,
            section: TaxSection::AssetsAndRights,
            view: ViewState::default(),
            copied,
            guard: RefreshGuard::new(),
        }
    }

    pub fn from_settings(settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        let source = HttpPortfolioSource::with_timeout_secs(settings.request_timeout_secs);
        Ok(Self::new(settings, Arc::new(source)))
    }

    // ── Loading ─────────────────────────────────────────────────────

    pub fn begin_refresh(&mut self) -> LoadTicket {
        let ticket = self.guard.begin();
        self.state = LoadState::Pending;
        debug!(endpoint = %self.settings.tax_report_endpoint, "tax report refresh started");
        ticket
    }

    pub fn fetch(&self) -> TaxReportFetch {
        TaxReportFetch {
            source: Arc::clone(&self.source),
            tax_service: Arc::clone(&self.tax_service),
            endpoint: self.settings.tax_report_endpoint.clone(),
        }
    }

    /// Apply a finished fetch; ignored after unmount or when superseded.
    pub fn complete_refresh(&mut self, ticket: LoadTicket, result: Result<TaxReport, CoreError>) -> bool {
        if !self.guard.accepts(ticket) {
            warn!("dropping stale tax report result");
            return false;
        }

        self.state = match result {
            Ok(report) => {
                let view = self.tax_service.build_tax_view(&report);
                if view.is_empty() {
                    LoadState::Empty
                } else {
                    LoadState::Ready(Arc::new(view))
                }
            }
            Err(e) => LoadState::Failed(e.user_message()),
        };
        // Drill-downs refer to the old report's tickers.
        self.view = ViewState::default();
        true
    }

    pub async fn refresh(&mut self) -> bool {
        let ticket = self.begin_refresh();
        let result = self.fetch().run().await;
        self.complete_refresh(ticket, result)
    }

    pub fn unmount(&mut self) {
        self.guard.unmount();
        self.copied.cancel();
    }

    // ── Reading ─────────────────────────────────────────────────────

    pub fn state(&self) -> &LoadState<TaxView> {
        &self.state
    }

    pub fn section(&self) -> TaxSection {
        self.section
    }

    pub fn expanded_ticker(&self) -> Option<&str> {
        self.view.expanded_ticker.as_deref()
    }

    pub fn is_expanded(&self, ticker: &str) -> bool {
        self.view.is_expanded(ticker)
    }

    /// Id of the copy button currently showing its confirmation.
    pub fn copied_id(&self) -> Option<String> {
        self.copied.current()
    }

    pub fn title(&self) -> Option<String> {
        self.state
            .data()
            .map(|v| self.tax_service.report_title(v.reference_year))
    }

    pub fn subtitle(&self) -> Option<String> {
        self.state
            .data()
            .map(|v| self.tax_service.report_subtitle(v.reference_year))
    }

    // ── User actions ────────────────────────────────────────────────

    pub fn select_section(&mut self, section: TaxSection) {
        self.section = section;
    }

    /// Open `ticker`'s drill-down, closing any other; closes it if already open.
    pub fn toggle_expanded(&mut self, ticker: &str) {
        self.view = self.view.toggle_expanded(ticker);
    }

    /// Text for the "Discriminação" copy button of `ticker`.
    /// Flashes `disc-{ticker}`; `None` when no such asset is loaded.
    pub fn copy_discrimination(&mut self, ticker: &str) -> Option<String> {
        let text = self.state.data()?.asset(ticker)?.discrimination.clone();
        self.copied.mark(format!("disc-{ticker}"));
        Some(text)
    }

    /// Year-end situation value of `ticker`, flashing `val-{ticker}`.
    pub fn copy_situation_value(&mut self, ticker: &str) -> Option<String> {
        let text = self.state.data()?.asset(ticker)?.situation_copy_value();
        self.copied.mark(format!("val-{ticker}"));
        Some(text)
    }

    /// Exempt income total of `ticker`, flashing `isento-{ticker}`.
    pub fn copy_exempt_income(&mut self, ticker: &str) -> Option<String> {
        let total = self
            .state
            .data()?
            .exempt_income
            .iter()
            .find(|e| e.ticker == ticker)?
            .total;
        self.copied.mark(format!("isento-{ticker}"));
        Some(copy_value(total))
    }

    /// JCP net value of `ticker`, flashing `jcp-{ticker}`.
    pub fn copy_exclusive_income(&mut self, ticker: &str) -> Option<String> {
        let net = self
            .state
            .data()?
            .exclusive_income
            .iter()
            .find(|e| e.ticker == ticker)?
            .net_value;
        self.copied.mark(format!("jcp-{ticker}"));
        Some(copy_value(net))
    }

    /// Result of `month` (1..=12), flashing `mes-{month}`.
    pub fn copy_monthly_result(&mut self, month: u32) -> Option<String> {
        let profit = self
            .state
            .data()?
            .monthly_results
            .iter()
            .find(|m| m.month == month)?
            .profit;
        self.copied.mark(format!("mes-{month}"));
        Some(copy_value(profit))
    }
}
