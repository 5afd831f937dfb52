use axum::http::StatusCode;
use thiserror::Error;

/// Unified error type for remote store operations that application code can handle
#[derive(Error, Debug)]
pub enum StoreError {
    /// Entity not found by the given identifier
    #[error("Entity not found")]
    NotFound,

    /// The store answered with a non-success status
    #[error("Remote store returned {status}: {message}")]
    Remote {
        status: StatusCode,
        message: String,
        /// PostgREST error code when the body carried one (e.g. "PGRST116")
        code: Option<String>,
    },

    /// The request never produced a usable response (DNS, TLS, timeout, ...)
    #[error("Remote store unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered 2xx but the payload didn't have the expected shape
    #[error("Unexpected store payload: {message}")]
    Decode { message: String },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode {
            message: err.to_string(),
        }
    }
}

/// Type alias for remote store operation results
pub type Result<T> = std::result::Result<T, StoreError>;
