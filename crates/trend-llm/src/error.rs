//! Error types for text-generation operations

use thiserror::Error;

/// Result type for text-generation operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur while talking to a text-generation service
#[derive(Error, Debug)]
pub enum LLMError {
    /// API request failed with a non-success status
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid API key or authentication failed
    #[error("Invalid API key or authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP transport error
    #[cfg(feature = "openai")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LLMError {
    /// Whether the service answered but the body did not match the expected shape
    pub fn is_malformed_response(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedResponse(_) | Self::SerializationError(_)
        )
    }
}
