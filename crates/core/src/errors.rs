use thiserror::Error;

/// Message shown to the user whenever a load fails, whatever the cause.
pub const LOAD_FAILURE_MESSAGE: &str = "Falha ao carregar dados do backend";

/// Unified error type for the entire portfolio-dashboard-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected HTTP status {status} from {endpoint}")]
    HttpStatus { endpoint: String, status: u16 },

    // ── Decoding ────────────────────────────────────────────────────
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid field `{field}` for {ticker}: {reason}")]
    Validation {
        ticker: String,
        field: &'static str,
        reason: String,
    },

    // ── Configuration ───────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// True for failures of the request itself (transport or non-success status).
    pub fn is_network(&self) -> bool {
        matches!(self, CoreError::Network(_) | CoreError::HttpStatus { .. })
    }

    /// True for bodies that arrived but could not be turned into records.
    pub fn is_parse(&self) -> bool {
        matches!(self, CoreError::Parse(_) | CoreError::Validation { .. })
    }

    /// The single user-visible message for a failed load.
    ///
    /// Network and parse failures collapse to the same text; the detailed
    /// `Display` output is meant for logs.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Config(msg) => format!("Configuração inválida: {msg}"),
            _ => LOAD_FAILURE_MESSAGE.to_string(),
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Parse(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Strip query strings: endpoints may carry access tokens.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        if e.is_decode() {
            CoreError::Parse(sanitized)
        } else {
            CoreError::Network(sanitized)
        }
    }
}
