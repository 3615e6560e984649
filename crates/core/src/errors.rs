//! Core error types for Cointrail.
//!
//! Storage backends convert their own failures (I/O, JSON, channel closure)
//! into [`StoreError`] so this type stays backend-agnostic.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the price-history domain.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Asset '{0}' not found")]
    NotFound(String),

    #[error("Price store operation failed: {0}")]
    Store(#[from] StoreError),
}

impl Error {
    /// True for failures caused by the caller's input rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::NotFound(_))
    }
}

/// Backend-agnostic error type for price store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing resource could not be read.
    #[error("Failed to read price store: {0}")]
    ReadFailed(String),

    /// The backing resource could not be written.
    #[error("Failed to write price store: {0}")]
    WriteFailed(String),

    /// The stored document exists but does not parse.
    #[error("Price store is corrupt: {0}")]
    Corrupt(String),

    /// The single writer stopped accepting jobs.
    #[error("Price store writer unavailable: {0}")]
    WriterUnavailable(String),
}

/// Validation errors for update requests.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Price must be a finite number, got {0}")]
    NonFinitePrice(f64),
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
