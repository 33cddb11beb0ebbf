//! Gateway error taxonomy.

use thiserror::Error;

/// Errors surfaced by the gateway outside the cache core.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or wrong credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Caller input failed validation (bad date range, empty metrics, ...).
    #[error("{0}")]
    Validation(String),

    /// A vendor API call failed.
    #[error("{service} API error: {message}")]
    Upstream { service: String, message: String },
}

pub type Result<T> = std::result::Result<T, GatewayError>;
