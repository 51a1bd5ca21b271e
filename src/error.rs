use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatementError {
    #[error("No year column found")]
    NoYearColumn,

    #[error("No rows found for symbol {symbol}")]
    NoRowsForSymbol { symbol: String },

    #[error("No data for years from {min_year} onwards")]
    EmptyResultSet { min_year: i32 },

    #[error("File is empty or malformed: {source_name}")]
    EmptyInput { source_name: String },

    #[error("No {role} column found")]
    MissingColumn { role: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "backend")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[cfg(feature = "backend")]
    #[error("API {endpoint} returned HTTP {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
}

impl StatementError {
    /// True for the failures raised while reshaping a statement table.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            Self::NoYearColumn | Self::NoRowsForSymbol { .. } | Self::EmptyResultSet { .. }
        )
    }
}

/// Validation failures of the exchange + symbol lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Please select an exchange first")]
    MissingExchange,

    #[error("Please enter a stock symbol")]
    MissingSymbol,

    #[error("Company data is not ready")]
    NotReady,

    #[error("Symbol \"{symbol}\" not found on exchange \"{exchange}\"")]
    NotFound { symbol: String, exchange: String },
}

pub type Result<T> = std::result::Result<T, StatementError>;
