//! Error types for stock trend operations

use chrono::NaiveDate;
use thiserror::Error;

/// Stock trend specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Bad or missing user input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Upstream returned no rows for the symbol and window
    #[error("No stock data found for '{symbol}' between {start} and {end}")]
    EmptySeries {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Upstream rows lack the expected date/price fields
    #[error("Unexpected data format for '{symbol}': {reason}")]
    Schema { symbol: String, reason: String },

    /// Date text in none of the supported formats
    #[error("Unrecognized date '{0}'")]
    DateParse(String),

    /// An operation that needs at least one bar got none
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    /// Third-party service error (transport, status, authentication)
    #[error("{provider} request failed: {detail}")]
    Upstream { provider: String, detail: String },

    /// Third-party service answered without the expected fields
    #[error("Malformed response from {provider}: {detail}")]
    MalformedResponse { provider: String, detail: String },

    /// File persistence error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Chart rendering error
    #[error("Chart rendering failed: {0}")]
    Chart(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StockError {
    /// Build an upstream failure for a provider
    pub fn upstream(provider: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.into(),
            detail: detail.into(),
        }
    }

    /// Build a malformed-response failure for a provider
    pub fn malformed(provider: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider: provider.into(),
            detail: detail.into(),
        }
    }

    /// Stable failure class name used in console messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationFailure",
            Self::EmptySeries { .. } => "EmptySeriesFailure",
            Self::Schema { .. } => "SchemaFailure",
            Self::DateParse(_) => "DateParseFailure",
            Self::EmptyInput(_) => "EmptyInputFailure",
            Self::Upstream { .. } => "UpstreamFailure",
            Self::MalformedResponse { .. } => "MalformedResponseFailure",
            Self::Io(_) | Self::Csv(_) => "IOFailure",
            Self::Chart(_) => "ChartFailure",
            Self::Config(_) => "ConfigFailure",
        }
    }
}

/// Result type alias for stock trend operations
pub type Result<T> = std::result::Result<T, StockError>;

/// Convert text-generation errors, splitting malformed bodies from failed requests
impl From<trend_llm::LLMError> for StockError {
    fn from(err: trend_llm::LLMError) -> Self {
        if err.is_malformed_response() {
            StockError::malformed("text generator", err.to_string())
        } else {
            StockError::upstream("text generator", err.to_string())
        }
    }
}
