//! Error types shared by the Spotify client, the reconciler and the HTTP
//! front end.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to the Web API or reconciling playlists.
#[derive(Error, Debug)]
pub enum SyncError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Too many requests, the server asked us to wait
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// The API answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Playlist (or other resource) could not be found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing, expired or rejected credentials
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Missing or invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single write call was handed more ids than the API accepts
    #[error("Batch of {len} items exceeds the limit of 100")]
    BatchTooLarge { len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl SyncError {
    /// Builds the error for a non-success response status.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => SyncError::NotFound(message),
            StatusCode::UNAUTHORIZED => SyncError::Auth(message),
            _ => SyncError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Whether the failure is worth retrying with exponential backoff.
    ///
    /// Connection problems, timeouts and 5xx responses are transient. Rate
    /// limiting is handled separately and is not reported here.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Request(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            SyncError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Transient failures after which a non-idempotent write is known not to
    /// have been applied: the connection was never made, or the server
    /// answered with an error. Timeouts are excluded, the write may have
    /// landed before the response was lost.
    pub fn is_retryable_write(&self) -> bool {
        match self {
            SyncError::Request(e) => e.is_connect(),
            SyncError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, SyncError>;
