use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Wire shape ──────────────────────────────────────────────────────
//
// The tax-report endpoint returns one object per reference year. Only the
// nested layout (custody and distribution blocks with drill-downs) is
// supported.

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaxReport {
    #[serde(rename = "ano_referencia")]
    pub reference_year: i32,

    #[serde(rename = "carteira_ir")]
    pub items: Vec<TaxReportItem>,

    #[serde(rename = "lucros_mensais", default)]
    pub monthly_profits: Vec<MonthlyProfitRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaxReportItem {
    #[serde(rename = "Ticker", alias = "ticker")]
    pub ticker: String,

    #[serde(rename = "CNPJ", alias = "cnpj", default)]
    pub cnpj: String,

    #[serde(rename = "Razao_Social", alias = "razao_social", default)]
    pub company_name: String,

    #[serde(rename = "custodia")]
    pub custody: Custody,

    #[serde(rename = "totais_proventos")]
    pub distributions: DistributionTotals,
}

/// Position held at year end and the trades that produced it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Custody {
    #[serde(rename = "quantidade")]
    pub quantity: f64,

    #[serde(rename = "preco_medio")]
    pub average_price: f64,

    #[serde(rename = "total_investido")]
    pub total_invested: f64,

    #[serde(rename = "movimentacoes", default)]
    pub trades: Vec<TradeEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    #[serde(rename = "data")]
    pub date: NaiveDate,

    /// Movement type as reported by the broker ("Compra", "Venda", ...)
    #[serde(rename = "tipo")]
    pub movement: String,

    #[serde(rename = "quantidade")]
    pub quantity: f64,

    #[serde(rename = "preco")]
    pub price: f64,

    #[serde(rename = "valor")]
    pub value: f64,
}

/// Distributions received during the reference year.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DistributionTotals {
    #[serde(rename = "dividendos", default)]
    pub dividends: f64,

    #[serde(rename = "juros_sobre_capital_proprio", default)]
    pub interest_on_equity: f64,

    /// Fund/equity yield distributions
    #[serde(rename = "rendimentos", default)]
    pub yields: f64,

    #[serde(rename = "reembolso", default)]
    pub reimbursement: f64,

    #[serde(rename = "eventos", default)]
    pub events: Vec<PayoutEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutEvent {
    #[serde(rename = "data")]
    pub date: NaiveDate,

    /// Payout type ("Dividendo", "JCP", "Rendimento", ...)
    #[serde(rename = "tipo")]
    pub kind: String,

    #[serde(rename = "valor_liquido")]
    pub net_value: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonthlyProfitRecord {
    #[serde(rename = "mes")]
    pub month: u32,

    #[serde(rename = "mes_nome", default)]
    pub month_name: Option<String>,

    #[serde(rename = "lucro")]
    pub profit: f64,
}

// ── Display shape ───────────────────────────────────────────────────

/// Ficha "Bens e Direitos": one entry per held ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetRightsEntry {
    pub ticker: String,
    pub cnpj: String,
    pub company_name: String,
    pub quantity: f64,
    pub average_price: f64,
    /// Situation on 31/12 of the reference year (cost basis)
    pub situation_value: f64,
    /// Suggested "Discriminação" text
    pub discrimination: String,
    pub trades: Vec<TradeEvent>,
}

/// Ficha "Rendimentos Isentos e Não Tributáveis".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExemptIncomeEntry {
    pub ticker: String,
    pub cnpj: String,
    pub company_name: String,
    pub dividends: f64,
    pub yields: f64,
    pub reimbursement: f64,
    pub total: f64,
    pub events: Vec<PayoutEvent>,
}

/// Ficha "Rendimentos Sujeitos à Tributação Exclusiva" (JCP).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExclusiveIncomeEntry {
    pub ticker: String,
    pub cnpj: String,
    pub company_name: String,
    pub net_value: f64,
    pub events: Vec<PayoutEvent>,
}

/// Realized gain or loss for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyResult {
    /// 1..=12
    pub month: u32,
    pub month_name: String,
    pub profit: f64,
}

impl MonthlyResult {
    pub fn is_loss(&self) -> bool {
        self.profit < 0.0
    }
}

/// The four IRPF report sections for one reference year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxView {
    pub reference_year: i32,
    pub assets_and_rights: Vec<AssetRightsEntry>,
    pub exempt_income: Vec<ExemptIncomeEntry>,
    pub exclusive_income: Vec<ExclusiveIncomeEntry>,
    /// Always exactly 12 entries, January first.
    pub monthly_results: Vec<MonthlyResult>,
}

impl TaxView {
    /// Nothing to declare: no positions and no realized result in any month.
    /// A year where everything was sold still has monthly results to show.
    pub fn is_empty(&self) -> bool {
        self.assets_and_rights.is_empty() && self.monthly_results.iter().all(|m| m.profit == 0.0)
    }

    pub fn asset(&self, ticker: &str) -> Option<&AssetRightsEntry> {
        self.assets_and_rights.iter().find(|a| a.ticker == ticker)
    }

    pub fn total_exempt_income(&self) -> f64 {
        self.exempt_income.iter().map(|e| e.total).sum()
    }

    pub fn total_exclusive_income(&self) -> f64 {
        self.exclusive_income.iter().map(|e| e.net_value).sum()
    }

    pub fn yearly_result(&self) -> f64 {
        self.monthly_results.iter().map(|m| m.profit).sum()
    }
}

/// Report section tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxSection {
    AssetsAndRights,
    ExemptIncome,
    ExclusiveIncome,
    VariableIncome,
}

impl TaxSection {
    pub const ALL: [TaxSection; 4] = [
        TaxSection::AssetsAndRights,
        TaxSection::ExemptIncome,
        TaxSection::ExclusiveIncome,
        TaxSection::VariableIncome,
    ];

    pub fn tab_label(&self) -> &'static str {
        match self {
            TaxSection::AssetsAndRights => "Bens e Direitos",
            TaxSection::ExemptIncome => "Rend. Isentos",
            TaxSection::ExclusiveIncome => "Tributação Exclusiva",
            TaxSection::VariableIncome => "Renda Variável",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TaxSection::AssetsAndRights => "Ficha: Bens e Direitos (Grupo 03 - Ações)",
            TaxSection::ExemptIncome => {
                "Rendimentos Isentos e Não Tributáveis (Cód. 09 - Dividendos)"
            }
            TaxSection::ExclusiveIncome => {
                "Rend. Sujeitos à Tributação Exclusiva (Cód. 10 - Juros Sobre Capital Próprio)"
            }
            TaxSection::VariableIncome => "Operações Comuns / Day-Trade (Ações)",
        }
    }
}
