// ═══════════════════════════════════════════════════════════════════
// Integration Tests — PortfolioDashboard and TaxReportPage view models,
// load lifecycle, copy indicator
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use portfolio_dashboard_core::clipboard::CopyFlash;
use portfolio_dashboard_core::errors::{CoreError, LOAD_FAILURE_MESSAGE};
use portfolio_dashboard_core::models::load_state::LoadState;
use portfolio_dashboard_core::models::portfolio::{PortfolioItemRecord, PortfolioSnapshot};
use portfolio_dashboard_core::models::settings::Settings;
use portfolio_dashboard_core::models::tax::{TaxReport, TaxSection};
use portfolio_dashboard_core::models::view_state::{SortDirection, SortField};
use portfolio_dashboard_core::providers::traits::PortfolioSource;
use portfolio_dashboard_core::{PortfolioDashboard, TaxReportPage};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("portfolio_dashboard_core=debug")
        .try_init();
}

fn rec(ticker: &str, invested: f64, rate: f64, dividends: f64, jcp: f64) -> PortfolioItemRecord {
    PortfolioItemRecord {
        ticker: ticker.into(),
        quantity: 10.0,
        average_price: invested / 10.0,
        total_invested: invested,
        internal_rate_of_return: rate,
        dividends,
        interest_on_equity: jcp,
    }
}

fn two_items() -> Vec<PortfolioItemRecord> {
    vec![
        rec("AAA", 1000.0, 10.0, 20.0, 0.0),
        rec("BBB", 3000.0, 5.0, 0.0, 15.0),
    ]
}

fn tax_report_json() -> &'static str {
    r#"{
        "ano_referencia": 2024,
        "carteira_ir": [
            {"Ticker": "PETR4", "CNPJ": "33.000.167/0001-01", "Razao_Social": "PETROBRAS",
             "custodia": {"quantidade": 100, "preco_medio": 30.5, "total_investido": 3050,
                "movimentacoes": [{"data": "2024-03-01", "tipo": "Compra", "quantidade": 100,
                                   "preco": 30.5, "valor": 3050}]},
             "totais_proventos": {"dividendos": 50, "juros_sobre_capital_proprio": 0,
                "eventos": [{"data": "2024-05-10", "tipo": "Dividendo", "valor_liquido": 50}]}},
            {"Ticker": "ITUB4", "CNPJ": "60.872.504/0001-23", "Razao_Social": "ITAU UNIBANCO",
             "custodia": {"quantidade": 200, "preco_medio": 25, "total_investido": 5000},
             "totais_proventos": {"dividendos": 0, "juros_sobre_capital_proprio": 80,
                "eventos": [{"data": "2024-07-01", "tipo": "JCP", "valor_liquido": 80}]}}
        ],
        "lucros_mensais": [{"mes": 2, "mes_nome": "Fevereiro", "lucro": 420.0},
                           {"mes": 9, "mes_nome": "Setembro", "lucro": -75.5}]
    }"#
}

// ═══════════════════════════════════════════════════════════════════
// Sources
// ═══════════════════════════════════════════════════════════════════

struct StaticSource {
    records: Vec<PortfolioItemRecord>,
    report: Option<TaxReport>,
}

impl StaticSource {
    fn portfolio(records: Vec<PortfolioItemRecord>) -> Arc<Self> {
        Arc::new(Self { records, report: None })
    }

    fn tax(json: &str) -> Arc<Self> {
        Arc::new(Self {
            records: vec![],
            report: Some(serde_json::from_str(json).unwrap()),
        })
    }
}

#[async_trait]
impl PortfolioSource for StaticSource {
    fn name(&self) -> &str {
        "Static"
    }

    async fn fetch_portfolio(&self, _endpoint: &str) -> Result<Vec<PortfolioItemRecord>, CoreError> {
        Ok(self.records.clone())
    }

    async fn fetch_tax_report(&self, _endpoint: &str) -> Result<TaxReport, CoreError> {
        self.report
            .clone()
            .ok_or_else(|| CoreError::Parse("no report".into()))
    }
}

struct FailingSource;

#[async_trait]
impl PortfolioSource for FailingSource {
    fn name(&self) -> &str {
        "Failing"
    }

    async fn fetch_portfolio(&self, _endpoint: &str) -> Result<Vec<PortfolioItemRecord>, CoreError> {
        Err(CoreError::Network("connection refused".into()))
    }

    async fn fetch_tax_report(&self, _endpoint: &str) -> Result<TaxReport, CoreError> {
        Err(CoreError::Parse("unexpected body".into()))
    }
}

/// Holds every request until the test opens the gate.
struct GatedSource {
    gate: Arc<Notify>,
    records: Vec<PortfolioItemRecord>,
}

#[async_trait]
impl PortfolioSource for GatedSource {
    fn name(&self) -> &str {
        "Gated"
    }

    async fn fetch_portfolio(&self, _endpoint: &str) -> Result<Vec<PortfolioItemRecord>, CoreError> {
        self.gate.notified().await;
        Ok(self.records.clone())
    }

    async fn fetch_tax_report(&self, _endpoint: &str) -> Result<TaxReport, CoreError> {
        self.gate.notified().await;
        Err(CoreError::Network("gated".into()))
    }
}

// ═══════════════════════════════════════════════════════════════════
// PortfolioDashboard
// ═══════════════════════════════════════════════════════════════════

mod dashboard {
    use super::*;

    #[test]
    fn starts_pending_with_no_rows() {
        let dash = PortfolioDashboard::new(Settings::default(), StaticSource::portfolio(two_items()));
        assert!(dash.state().is_pending());
        assert!(dash.summary().is_none());
        assert!(dash.rows().is_empty());
    }

    #[tokio::test]
    async fn two_item_end_to_end() {
        init_tracing();
        let mut dash =
            PortfolioDashboard::new(Settings::default(), StaticSource::portfolio(two_items()));
        assert!(dash.refresh().await);

        let summary = dash.summary().unwrap();
        assert_eq!(summary.totals.total_invested, 4000.0);
        assert_eq!(summary.totals.total_dividends, 20.0);
        assert_eq!(summary.totals.total_interest_on_equity, 15.0);
        assert!((summary.totals.weighted_rate.unwrap() - 6.25).abs() < 1e-12);
        assert_eq!(summary.positions, 2);
        assert_eq!(dash.rows().len(), 2);
        assert_eq!(dash.state().data().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_response_is_its_own_state() {
        let mut dash = PortfolioDashboard::new(Settings::default(), StaticSource::portfolio(vec![]));
        dash.refresh().await;
        assert_eq!(*dash.state(), LoadState::Empty);
        assert!(dash.summary().is_none());
        assert!(dash.state().error().is_none());
    }

    #[tokio::test]
    async fn failure_shows_single_message_and_no_data() {
        let mut dash = PortfolioDashboard::new(Settings::default(), Arc::new(FailingSource));
        dash.refresh().await;
        assert_eq!(dash.state().error(), Some(LOAD_FAILURE_MESSAGE));
        assert!(dash.state().data().is_none());
        assert!(dash.summary().is_none());
        assert!(dash.rows().is_empty());
    }

    #[tokio::test]
    async fn invalid_data_fails_whole_load() {
        let mut bad = two_items();
        bad[1].total_invested = -1.0;
        let mut dash = PortfolioDashboard::new(Settings::default(), StaticSource::portfolio(bad));
        dash.refresh().await;
        assert_eq!(dash.state().error(), Some(LOAD_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn rows_follow_search_and_sort() {
        let records = vec![
            rec("VALE3", 2000.0, 4.0, 30.0, 0.0),
            rec("PETR4", 1000.0, 12.0, 50.0, 10.0),
            rec("PETR3", 1500.0, 8.0, 0.0, 0.0),
        ];
        let mut dash = PortfolioDashboard::new(Settings::default(), StaticSource::portfolio(records));
        dash.refresh().await;

        dash.set_search_term("petr");
        let rows: Vec<&str> = dash.rows().iter().map(|i| i.ticker.as_str()).collect();
        assert_eq!(rows, vec!["PETR4", "PETR3"]);

        dash.toggle_sort(SortField::TotalInvested);
        let rows: Vec<&str> = dash.rows().iter().map(|i| i.ticker.as_str()).collect();
        assert_eq!(rows, vec!["PETR4", "PETR3"]);

        dash.toggle_sort(SortField::TotalInvested);
        assert_eq!(dash.view().sort_direction, SortDirection::Descending);
        let rows: Vec<&str> = dash.rows().iter().map(|i| i.ticker.as_str()).collect();
        assert_eq!(rows, vec!["PETR3", "PETR4"]);

        dash.set_search_term("");
        dash.clear_sort();
        let rows: Vec<&str> = dash.rows().iter().map(|i| i.ticker.as_str()).collect();
        assert_eq!(rows, vec!["VALE3", "PETR4", "PETR3"]);

        // Summary is independent of the table projection
        assert_eq!(dash.summary().unwrap().totals.total_invested, 4500.0);
    }

    #[tokio::test]
    async fn expansion_is_one_ticker_at_a_time() {
        let mut dash =
            PortfolioDashboard::new(Settings::default(), StaticSource::portfolio(two_items()));
        dash.refresh().await;
        dash.toggle_expanded("AAA");
        dash.toggle_expanded("BBB");
        assert!(dash.view().is_expanded("BBB"));
        assert!(!dash.view().is_expanded("AAA"));
        dash.toggle_expanded("BBB");
        assert_eq!(dash.view().expanded_ticker, None);
    }

    #[tokio::test]
    async fn view_stays_usable_while_fetch_is_outstanding() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(GatedSource {
            gate: Arc::clone(&gate),
            records: two_items(),
        });
        let mut dash = PortfolioDashboard::new(Settings::default(), source);

        let ticket = dash.begin_refresh();
        let handle = tokio::spawn(dash.fetch().run());

        dash.set_search_term("bb");
        dash.toggle_sort(SortField::Dividends);
        assert!(dash.state().is_pending());
        assert_eq!(dash.view().search_term, "bb");

        gate.notify_one();
        let result = handle.await.unwrap();
        assert!(dash.complete_refresh(ticket, result));

        let rows: Vec<&str> = dash.rows().iter().map(|i| i.ticker.as_str()).collect();
        assert_eq!(rows, vec!["BBB"]);
    }

    #[tokio::test]
    async fn stale_result_is_dropped() {
        let mut dash =
            PortfolioDashboard::new(Settings::default(), StaticSource::portfolio(two_items()));
        let old = dash.begin_refresh();
        let new = dash.begin_refresh();

        let stale = PortfolioSnapshot::from_records(vec![rec("OLD3", 1.0, 0.0, 0.0, 0.0)]).unwrap();
        assert!(!dash.complete_refresh(old, Ok(stale)));
        assert!(dash.state().is_pending());

        let fresh = dash.fetch().run().await;
        assert!(dash.complete_refresh(new, fresh));
        assert_eq!(dash.state().data().unwrap().items()[0].ticker, "AAA");
    }

    #[tokio::test]
    async fn result_after_unmount_is_ignored() {
        let mut dash =
            PortfolioDashboard::new(Settings::default(), StaticSource::portfolio(two_items()));
        let ticket = dash.begin_refresh();
        let result = dash.fetch().run().await;
        dash.unmount();
        assert!(!dash.complete_refresh(ticket, result));
        assert!(dash.state().is_pending());
    }

    #[tokio::test]
    async fn manual_refresh_replaces_snapshot_wholesale() {
        let mut dash = PortfolioDashboard::new(Settings::default(), Arc::new(FailingSource));
        dash.refresh().await;
        assert!(dash.state().error().is_some());

        // A retry only happens when asked for.
        let ticket = dash.begin_refresh();
        assert!(dash.state().is_pending());
        let snap = PortfolioSnapshot::from_records(two_items()).unwrap();
        assert!(dash.complete_refresh(ticket, Ok(snap)));
        assert_eq!(dash.state().data().unwrap().len(), 2);

        let ticket = dash.begin_refresh();
        let snap = PortfolioSnapshot::from_records(vec![rec("CCC", 5.0, 1.0, 0.0, 0.0)]).unwrap();
        dash.complete_refresh(ticket, Ok(snap));
        let items = dash.state().data().unwrap().items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].ticker, "CCC");
    }

    #[tokio::test]
    async fn loads_over_http() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/carteira")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"ticker": "AAA", "quantidade": 10, "preco_medio": 100,
                     "total_investido": 1000, "TIR": 10, "dividendos": 20,
                     "juros_sobre_capital_proprio": 0},
                    {"ticker": "BBB", "quantidade": 30, "preco_medio": 100,
                     "total_investido": 3000, "TIR": 5, "dividendos": 0,
                     "juros_sobre_capital_proprio": 15}]"#,
            )
            .create_async()
            .await;

        let settings = Settings {
            portfolio_endpoint: format!("{}/carteira", server.url()),
            ..Settings::default()
        };
        let mut dash = PortfolioDashboard::from_settings(settings).unwrap();
        assert!(dash.refresh().await);
        let totals = dash.summary().unwrap().totals;
        assert_eq!(totals.total_invested, 4000.0);
        assert!((totals.weighted_rate.unwrap() - 6.25).abs() < 1e-12);
    }

    #[test]
    fn from_settings_rejects_bad_endpoint() {
        let settings = Settings {
            portfolio_endpoint: "carteira".into(),
            ..Settings::default()
        };
        assert!(matches!(
            PortfolioDashboard::from_settings(settings),
            Err(CoreError::Config(_))
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// TaxReportPage
// ═══════════════════════════════════════════════════════════════════

mod tax_page {
    use super::*;

    fn settings() -> Settings {
        Settings {
            broker_name: "Clear".into(),
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn loads_and_groups_report() {
        init_tracing();
        let mut page = TaxReportPage::new(settings(), StaticSource::tax(tax_report_json()));
        assert!(page.state().is_pending());
        assert!(page.refresh().await);

        let view = page.state().data().unwrap();
        assert_eq!(view.reference_year, 2024);
        assert_eq!(view.assets_and_rights.len(), 2);
        assert_eq!(view.exempt_income.len(), 1);
        assert_eq!(view.exempt_income[0].ticker, "PETR4");
        assert_eq!(view.exclusive_income.len(), 1);
        assert_eq!(view.exclusive_income[0].ticker, "ITUB4");
        assert_eq!(view.monthly_results.len(), 12);
        assert_eq!(view.monthly_results[1].profit, 420.0);
        assert_eq!(view.monthly_results[8].profit, -75.5);

        assert_eq!(page.title().unwrap(), "Auxiliar de Declaração IRPF 2025");
        assert_eq!(
            page.subtitle().unwrap(),
            "Ano-calendário 2024 | Posição em 31/12/2024"
        );
    }

    #[tokio::test]
    async fn failure_has_no_partial_data() {
        let mut page = TaxReportPage::new(settings(), Arc::new(FailingSource));
        page.refresh().await;
        assert_eq!(page.state().error(), Some(LOAD_FAILURE_MESSAGE));
        assert!(page.title().is_none());
    }

    #[tokio::test]
    async fn report_without_items_is_empty() {
        let json = r#"{"ano_referencia": 2024, "carteira_ir": [], "lucros_mensais": []}"#;
        let mut page = TaxReportPage::new(settings(), StaticSource::tax(json));
        page.refresh().await;
        assert_eq!(*page.state(), LoadState::Empty);
    }

    #[tokio::test]
    async fn realized_gains_without_positions_are_shown() {
        let json = r#"{"ano_referencia": 2024, "carteira_ir": [],
                       "lucros_mensais": [{"mes": 3, "lucro": 5000.0}]}"#;
        let mut page = TaxReportPage::new(settings(), StaticSource::tax(json));
        page.refresh().await;

        let view = page.state().data().unwrap();
        assert!(view.assets_and_rights.is_empty());
        assert_eq!(view.monthly_results.len(), 12);
        assert_eq!(view.monthly_results[2].profit, 5000.0);
        assert_eq!(page.copy_monthly_result(3).as_deref(), Some("5000.00"));
        assert_eq!(page.copied_id().as_deref(), Some("mes-3"));
    }

    #[tokio::test]
    async fn padded_tickers_are_copyable_by_symbol() {
        let json = tax_report_json().replace(r#""Ticker": "PETR4""#, r#""Ticker": " PETR4 ""#);
        let mut page = TaxReportPage::new(settings(), StaticSource::tax(&json));
        page.refresh().await;

        let text = page.copy_discrimination("PETR4").unwrap();
        assert!(text.contains("(PETR4)."));
        assert_eq!(page.copy_exempt_income("PETR4").as_deref(), Some("50.00"));
        assert_eq!(page.copied_id().as_deref(), Some("isento-PETR4"));
    }

    #[test]
    fn copy_works_without_async_runtime() {
        let mut page = TaxReportPage::new(settings(), StaticSource::tax(tax_report_json()));
        let ticket = page.begin_refresh();
        let report: TaxReport = serde_json::from_str(tax_report_json()).unwrap();
        assert!(page.complete_refresh(ticket, Ok(report)));

        assert!(page.copy_discrimination("PETR4").is_some());
        assert_eq!(page.copied_id().as_deref(), Some("disc-PETR4"));
        page.unmount();
        assert_eq!(page.copied_id(), None);
    }

    #[tokio::test]
    async fn invalid_month_fails_load() {
        let json = r#"{"ano_referencia": 2024, "carteira_ir": [],
                       "lucros_mensais": [{"mes": 13, "lucro": 1}]}"#;
        let mut page = TaxReportPage::new(settings(), StaticSource::tax(json));
        page.refresh().await;
        assert_eq!(page.state().error(), Some(LOAD_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn sections_and_expansion() {
        let mut page = TaxReportPage::new(settings(), StaticSource::tax(tax_report_json()));
        page.refresh().await;

        assert_eq!(page.section(), TaxSection::AssetsAndRights);
        page.select_section(TaxSection::VariableIncome);
        assert_eq!(page.section(), TaxSection::VariableIncome);

        page.toggle_expanded("PETR4");
        assert!(page.is_expanded("PETR4"));
        page.toggle_expanded("ITUB4");
        assert_eq!(page.expanded_ticker(), Some("ITUB4"));
        assert!(!page.is_expanded("PETR4"));
        page.toggle_expanded("ITUB4");
        assert_eq!(page.expanded_ticker(), None);
    }

    #[tokio::test]
    async fn refresh_collapses_drill_downs() {
        let mut page = TaxReportPage::new(settings(), StaticSource::tax(tax_report_json()));
        page.refresh().await;
        page.toggle_expanded("PETR4");
        page.refresh().await;
        assert_eq!(page.expanded_ticker(), None);
    }

    #[tokio::test]
    async fn copy_buttons_return_text_and_flash() {
        let mut page = TaxReportPage::new(settings(), StaticSource::tax(tax_report_json()));
        page.refresh().await;

        let text = page.copy_discrimination("PETR4").unwrap();
        assert_eq!(
            text,
            "100 ações de PETROBRAS (PETR4). Custo médio de R$ 30.50. Custodiado na corretora Clear."
        );
        assert_eq!(page.copied_id().as_deref(), Some("disc-PETR4"));

        assert_eq!(page.copy_situation_value("ITUB4").unwrap(), "5000.00");
        assert_eq!(page.copied_id().as_deref(), Some("val-ITUB4"));

        assert_eq!(page.copy_exempt_income("PETR4").unwrap(), "50.00");
        assert_eq!(page.copy_exclusive_income("ITUB4").unwrap(), "80.00");
        assert_eq!(page.copy_monthly_result(9).unwrap(), "-75.50");
        assert_eq!(page.copied_id().as_deref(), Some("mes-9"));
    }

    #[tokio::test]
    async fn copy_of_unknown_target_does_nothing() {
        let mut page = TaxReportPage::new(settings(), StaticSource::tax(tax_report_json()));
        page.refresh().await;
        assert!(page.copy_discrimination("XXXX3").is_none());
        assert!(page.copy_exclusive_income("PETR4").is_none());
        assert!(page.copy_monthly_result(13).is_none());
        assert_eq!(page.copied_id(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn copy_flash_clears_after_configured_delay() {
        let mut page = TaxReportPage::new(settings(), StaticSource::tax(tax_report_json()));
        page.refresh().await;
        page.copy_discrimination("PETR4");
        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(page.copied_id().as_deref(), Some("disc-PETR4"));
        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(page.copied_id(), None);
    }

    #[tokio::test]
    async fn unmount_drops_results_and_clears_flash() {
        let gate = Arc::new(Notify::new());
        let mut page = TaxReportPage::new(
            settings(),
            Arc::new(GatedSource {
                gate: Arc::clone(&gate),
                records: vec![],
            }),
        );
        let ticket = page.begin_refresh();
        let handle = tokio::spawn(page.fetch().run());
        page.unmount();
        gate.notify_one();
        let result = handle.await.unwrap();
        assert!(!page.complete_refresh(ticket, result));
        assert!(page.state().is_pending());
        assert_eq!(page.copied_id(), None);
    }
}

// ═══════════════════════════════════════════════════════════════════
// CopyFlash
// ═══════════════════════════════════════════════════════════════════

mod copy_flash {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn clears_itself() {
        let mut flash = CopyFlash::new(Duration::from_millis(2000));
        assert_eq!(flash.current(), None);
        flash.mark("val-0");
        assert!(flash.is_active("val-0"));
        tokio::time::sleep(Duration::from_millis(2100)).await;
        tokio::task::yield_now().await;
        assert_eq!(flash.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn second_copy_restarts_the_delay() {
        let mut flash = CopyFlash::new(Duration::from_millis(2000));
        flash.mark("disc-0");
        tokio::time::sleep(Duration::from_millis(1500)).await;
        flash.mark("val-0");

        // The first timer would have fired at 2000ms.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        tokio::task::yield_now().await;
        assert_eq!(flash.current().as_deref(), Some("val-0"));

        tokio::time::sleep(Duration::from_millis(600)).await;
        tokio::task::yield_now().await;
        assert_eq!(flash.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn same_id_twice_extends() {
        let mut flash = CopyFlash::new(Duration::from_millis(1000));
        flash.mark("a");
        tokio::time::sleep(Duration::from_millis(900)).await;
        flash.mark("a");
        tokio::time::sleep(Duration::from_millis(900)).await;
        tokio::task::yield_now().await;
        assert!(flash.is_active("a"));
    }

    #[tokio::test]
    async fn cancel_clears_immediately() {
        let mut flash = CopyFlash::new(Duration::from_secs(60));
        flash.mark("a");
        flash.cancel();
        assert_eq!(flash.current(), None);
    }

    #[test]
    fn marks_outside_a_runtime() {
        let mut flash = CopyFlash::new(Duration::from_secs(60));
        flash.mark("a");
        assert!(flash.is_active("a"));
        flash.mark("b");
        assert_eq!(flash.current().as_deref(), Some("b"));
        flash.cancel();
        assert_eq!(flash.current(), None);
    }

    #[test]
    fn expires_on_read_outside_a_runtime() {
        let mut flash = CopyFlash::new(Duration::ZERO);
        flash.mark("a");
        assert_eq!(flash.current(), None);
        assert!(!flash.is_active("a"));
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let mut flash = CopyFlash::new(Duration::from_secs(60));
        let mut rx = flash.subscribe();
        flash.mark("disc-1");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_deref(), Some("disc-1"));
    }
}
