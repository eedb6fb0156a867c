//! Core error types for the GIVD application.
//!
//! This module defines store-agnostic error types. Backend-specific errors
//! (HTTP, JSON decoding, auth responses) are converted to these types by the
//! adapter layer.

use thiserror::Error;

use crate::consumption::FeedError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the application.
///
/// Store errors are wrapped in string form so this type does not depend on
/// any particular backend client.
#[derive(Error, Debug)]
pub enum Error {
    #[error("No authenticated user")]
    NotAuthenticated,

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Live feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Plan limit reached: {0}")]
    PlanLimitReached(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Store-agnostic error type for remote reads and writes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with a failure.
    #[error("Store request failed: {0}")]
    RequestFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The store refused the request (permissions, constraint, auth).
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The store answered with a payload we could not decode.
    #[error("Malformed store payload: {0}")]
    Decode(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}

impl Error {
    /// Shorthand for an `InvalidInput` validation error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::Validation(ValidationError::InvalidInput(message.into()))
    }

    /// Shorthand for a `MissingField` validation error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Error::Validation(ValidationError::MissingField(field.into()))
    }
}
