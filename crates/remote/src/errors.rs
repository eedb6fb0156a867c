//! Error types for the remote backend crate.
//!
//! `RemoteError` is internal to the adapters and is converted to the
//! store-agnostic `givd_core::Error` before reaching services.

use givd_core::errors::{Error, StoreError};
use thiserror::Error;

/// Result type alias for remote operations.
pub type Result<T> = std::result::Result<T, RemoteError>;

/// Errors that can occur while talking to the hosted backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the backend
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Authentication error (missing or invalid session)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Invalid request (missing required data, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The realtime stream failed or sent something unreadable
    #[error("Realtime stream error: {0}")]
    Stream(String),
}

impl RemoteError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}

impl From<RemoteError> for Error {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Http(e) => Error::Store(StoreError::Unavailable(e.to_string())),
            RemoteError::Json(e) => Error::Store(StoreError::Decode(e.to_string())),
            RemoteError::Api { status: 401, .. } => Error::NotAuthenticated,
            RemoteError::Api { status: 404, message } => {
                Error::Store(StoreError::NotFound(message))
            }
            RemoteError::Api { status, message } if (400..500).contains(&status) => {
                Error::Store(StoreError::Rejected(format!("{} ({})", message, status)))
            }
            RemoteError::Api { status, message } => {
                Error::Store(StoreError::RequestFailed(format!("{} ({})", message, status)))
            }
            RemoteError::Auth(_) => Error::NotAuthenticated,
            RemoteError::InvalidRequest(message) => Error::invalid_input(message),
            RemoteError::Stream(message) => Error::Store(StoreError::Unavailable(message)),
        }
    }
}
