//! Error types for OpenAI client.

use thiserror::Error;

/// Result type for OpenAI client operations.
pub type Result<T> = std::result::Result<T, OpenAIError>;

/// OpenAI client errors.
#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response from the API
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),

    /// The API answered but produced no message content
    #[error("empty completion")]
    EmptyCompletion,
}

impl OpenAIError {
    /// Whether retrying the same request later could succeed.
    ///
    /// Network failures, rate limits (429) and server errors (5xx) are
    /// transient; auth and request-shape errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::EmptyCompletion => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Config(_) | Self::Parse(_) => false,
        }
    }
}
