//! Error types for Evergreen API operations.

use thiserror::Error;

/// Errors that can occur during Evergreen API operations.
#[derive(Debug, Error)]
pub enum EvgError {
    /// Configuration is missing or incomplete.
    #[error("Evergreen configuration required: {0}")]
    ConfigMissing(String),

    /// API request returned a non-success status.
    ///
    /// Inside a paginated stream this aborts the whole sequence at the
    /// position of the failed page; no items from that page or later pages
    /// are ever yielded.
    #[error("Evergreen API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON decode error, either a malformed response body or a record that
    /// a model decoder rejected.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A background page-prefetch task was cancelled or panicked.
    #[error("Prefetch task failed: {0}")]
    Prefetch(#[from] tokio::task::JoinError),
}

/// Result type alias for Evergreen operations.
pub type Result<T> = core::result::Result<T, EvgError>;
