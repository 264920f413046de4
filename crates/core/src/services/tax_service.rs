use std::collections::HashSet;

use crate::errors::CoreError;
use crate::models::portfolio::ensure_non_negative;
use crate::models::tax::{
    AssetRightsEntry, ExclusiveIncomeEntry, ExemptIncomeEntry, MonthlyResult, PayoutEvent,
    TaxReport, TaxReportItem, TaxView,
};
use crate::services::format::copy_value;

pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho",
    "Julho", "Agosto", "Setembro", "Outubro", "Novembro", "Dezembro",
];

/// Groups the yearly tax report into the IRPF declaration sections and
/// produces the text the user pastes into them.
pub struct TaxService {
    broker_name: String,
}

impl TaxService {
    /// `broker_name` is quoted in the "Discriminação" text of every asset.
    pub fn new(broker_name: impl Into<String>) -> Self {
        Self {
            broker_name: broker_name.into(),
        }
    }

    /// Reject reports that cannot be shown faithfully.
    ///
    /// Called at the fetch boundary: empty or duplicated tickers, negative
    /// custody, trade or payout figures, and months outside 1..=12 or listed
    /// twice are all parse failures.
    pub fn validate_report(&self, report: &TaxReport) -> Result<(), CoreError> {
        let mut tickers = HashSet::new();
        for item in &report.items {
            let ticker = item.ticker.trim();
            if ticker.is_empty() {
                return Err(CoreError::Validation {
                    ticker: "<empty>".into(),
                    field: "Ticker",
                    reason: "ticker must not be empty".into(),
                });
            }
            if !tickers.insert(ticker.to_string()) {
                return Err(CoreError::Validation {
                    ticker: ticker.to_string(),
                    field: "Ticker",
                    reason: "duplicated ticker in report".into(),
                });
            }

            let custody = &item.custody;
            let dist = &item.distributions;
            for (field, value) in [
                ("custodia.quantidade", custody.quantity),
                ("custodia.preco_medio", custody.average_price),
                ("custodia.total_investido", custody.total_invested),
                ("totais_proventos.dividendos", dist.dividends),
                ("totais_proventos.juros_sobre_capital_proprio", dist.interest_on_equity),
                ("totais_proventos.rendimentos", dist.yields),
                ("totais_proventos.reembolso", dist.reimbursement),
            ] {
                ensure_non_negative(ticker, field, value)?;
            }
            for trade in &custody.trades {
                ensure_non_negative(ticker, "custodia.movimentacoes.preco", trade.price)?;
                ensure_non_negative(ticker, "custodia.movimentacoes.valor", trade.value)?;
            }
            for event in &dist.events {
                ensure_non_negative(
                    ticker,
                    "totais_proventos.eventos.valor_liquido",
                    event.net_value,
                )?;
            }
        }

        let mut seen = [false; 12];
        for record in &report.monthly_profits {
            if !(1..=12).contains(&record.month) {
                return Err(CoreError::Parse(format!(
                    "month {} outside 1..=12 in lucros_mensais",
                    record.month
                )));
            }
            let slot = &mut seen[(record.month - 1) as usize];
            if *slot {
                return Err(CoreError::Parse(format!(
                    "month {} listed twice in lucros_mensais",
                    record.month
                )));
            }
            *slot = true;
            if !record.profit.is_finite() {
                return Err(CoreError::Parse(format!(
                    "non-finite profit for month {}",
                    record.month
                )));
            }
        }

        Ok(())
    }

    /// Split the report into the four declaration sections.
    ///
    /// - Assets and rights: every item.
    /// - Exempt income: items with dividends + yields + reimbursement > 0.
    /// - Exclusively-taxed income: items with JCP > 0.
    /// - Monthly results: always twelve months, January first; months the
    ///   report omits are zero.
    pub fn build_tax_view(&self, report: &TaxReport) -> TaxView {
        let assets_and_rights = report
            .items
            .iter()
            .map(|item| self.asset_entry(item))
            .collect();

        let exempt_income = report
            .items
            .iter()
            .filter_map(|item| {
                let d = &item.distributions;
                let total = d.dividends + d.yields + d.reimbursement;
                (total > 0.0).then(|| ExemptIncomeEntry {
                    ticker: ticker_of(item),
                    cnpj: item.cnpj.clone(),
                    company_name: item.company_name.clone(),
                    dividends: d.dividends,
                    yields: d.yields,
                    reimbursement: d.reimbursement,
                    total,
                    events: payouts(&d.events, false),
                })
            })
            .collect();

        let exclusive_income = report
            .items
            .iter()
            .filter(|item| item.distributions.interest_on_equity > 0.0)
            .map(|item| ExclusiveIncomeEntry {
                ticker: ticker_of(item),
                cnpj: item.cnpj.clone(),
                company_name: item.company_name.clone(),
                net_value: item.distributions.interest_on_equity,
                events: payouts(&item.distributions.events, true),
            })
            .collect();

        TaxView {
            reference_year: report.reference_year,
            assets_and_rights,
            exempt_income,
            exclusive_income,
            monthly_results: monthly_results(report),
        }
    }

    /// Suggested "Discriminação" for an asset.
    pub fn discrimination(&self, item: &TaxReportItem) -> String {
        let ticker = item.ticker.trim();
        let company = if item.company_name.trim().is_empty() {
            ticker
        } else {
            item.company_name.as_str()
        };
        format!(
            "{} ações de {} ({}). Custo médio de R$ {:.2}. Custodiado na corretora {}.",
            item.custody.quantity,
            company,
            ticker,
            item.custody.average_price,
            self.broker_name,
        )
    }

    /// Header line of the report: "Auxiliar de Declaração IRPF 2025" for 2024.
    pub fn report_title(&self, reference_year: i32) -> String {
        format!("Auxiliar de Declaração IRPF {}", reference_year + 1)
    }

    /// "Ano-calendário 2024 | Posição em 31/12/2024"
    pub fn report_subtitle(&self, reference_year: i32) -> String {
        format!("Ano-calendário {reference_year} | Posição em 31/12/{reference_year}")
    }

    fn asset_entry(&self, item: &TaxReportItem) -> AssetRightsEntry {
        AssetRightsEntry {
            ticker: ticker_of(item),
            cnpj: item.cnpj.clone(),
            company_name: item.company_name.clone(),
            quantity: item.custody.quantity,
            average_price: item.custody.average_price,
            situation_value: item.custody.total_invested,
            discrimination: self.discrimination(item),
            trades: item.custody.trades.clone(),
        }
    }
}

impl AssetRightsEntry {
    /// "Situação em 31/12" figure as pasted into the IRPF program.
    pub fn situation_copy_value(&self) -> String {
        copy_value(self.situation_value)
    }
}

/// Tickers are matched and displayed without surrounding whitespace.
fn ticker_of(item: &TaxReportItem) -> String {
    item.ticker.trim().to_string()
}

/// A payout is JCP when its type names interest on equity.
fn is_interest_on_equity(event: &PayoutEvent) -> bool {
    let kind = event.kind.to_lowercase();
    kind.contains("jcp") || kind.contains("juros")
}

fn payouts(events: &[PayoutEvent], interest_on_equity: bool) -> Vec<PayoutEvent> {
    events
        .iter()
        .filter(|e| is_interest_on_equity(e) == interest_on_equity)
        .cloned()
        .collect()
}

fn monthly_results(report: &TaxReport) -> Vec<MonthlyResult> {
    let mut months: Vec<MonthlyResult> = MONTH_NAMES
        .iter()
        .zip(1u32..)
        .map(|(name, month)| MonthlyResult {
            month,
            month_name: (*name).to_string(),
            profit: 0.0,
        })
        .collect();

    for record in &report.monthly_profits {
        if !(1..=12).contains(&record.month) {
            continue;
        }
        let slot = &mut months[(record.month - 1) as usize];
        slot.profit = record.profit;
        if let Some(name) = record.month_name.as_deref().filter(|n| !n.trim().is_empty()) {
            slot.month_name = name.to_string();
        }
    }

    months
}
