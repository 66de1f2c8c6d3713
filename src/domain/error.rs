//! Domain error types.

/// Top-level error type for tradeledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("market data error for {ticker}: {reason}")]
    MarketData { ticker: String, reason: String },

    #[error("price data error: {reason}")]
    PriceData { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        LedgerError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl LedgerError {
    /// Process exit status for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            LedgerError::Io(_) => 1,
            LedgerError::ConfigParse { .. }
            | LedgerError::ConfigMissing { .. }
            | LedgerError::ConfigInvalid { .. } => 2,
            LedgerError::Database { .. } | LedgerError::DatabaseQuery { .. } => 3,
            LedgerError::MarketData { .. } | LedgerError::PriceData { .. } => 5,
        }
    }
}

impl From<&LedgerError> for std::process::ExitCode {
    fn from(err: &LedgerError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
