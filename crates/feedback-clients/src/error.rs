//! Client error types.

use thiserror::Error;

/// Errors raised by the concrete collaborators.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Client could not be configured
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Service answered 429
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Service answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// Response could not be understood
    #[error("Parse error: {0}")]
    Parse(String),

    /// Snapshot file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e.to_string())
    }
}
