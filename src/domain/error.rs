//! Domain error types.

/// Shown when an input string matches none of the known address shapes.
pub const INVALID_ADDRESS_MESSAGE: &str = "Invalid address format.";

/// Shown for every failure after classification: transport, parse, or an
/// explorer answer that carries no transactions.
pub const RETRIEVAL_FAILED_MESSAGE: &str = "Unable to recognize or retrieve address information";

/// Top-level error type for coinlens.
#[derive(Debug, thiserror::Error)]
pub enum CoinlensError {
    #[error("unrecognized address format: {input:?}")]
    UnrecognizedAddress { input: String },

    #[error("explorer request failed: {reason}")]
    FetchFailed { reason: String },

    #[error("no transactions found for {address}")]
    NoTransactions { address: String },

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

    #[error("price data error: {reason}")]
    DataSource { reason: String },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient price data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoinlensError {
    /// The fixed message an address query surfaces to the user. Errors that
    /// do not belong to the query flow fall back to their `Display` text.
    pub fn user_message(&self) -> String {
        match self {
            CoinlensError::UnrecognizedAddress { .. } => INVALID_ADDRESS_MESSAGE.to_string(),
            CoinlensError::FetchFailed { .. } | CoinlensError::NoTransactions { .. } => {
                RETRIEVAL_FAILED_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<&CoinlensError> for std::process::ExitCode {
    fn from(err: &CoinlensError) -> Self {
        let code: u8 = match err {
            CoinlensError::Io(_) => 1,
            CoinlensError::ConfigParse { .. }
            | CoinlensError::ConfigMissing { .. }
            | CoinlensError::ConfigInvalid { .. } => 2,
            CoinlensError::FetchFailed { .. } | CoinlensError::DataSource { .. } => 3,
            CoinlensError::UnrecognizedAddress { .. } => 4,
            CoinlensError::NoTransactions { .. }
            | CoinlensError::NoData { .. }
            | CoinlensError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
