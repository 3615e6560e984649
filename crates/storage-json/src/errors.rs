//! Storage-specific error types for the JSON file backend.
//!
//! These wrap `std::io` and `serde_json` failures and are converted to
//! `cointrail_core::Error` before leaving the crate.

use cointrail_core::errors::{Error, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Reading {path} failed: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Writing {path} failed: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} does not contain a valid price document: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Writer task stopped: {0}")]
    WriterClosed(String),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        let message = err.to_string();
        match err {
            StorageError::Read { .. } => Error::Store(StoreError::ReadFailed(message)),
            StorageError::Write { .. } | StorageError::Serialization(_) => {
                Error::Store(StoreError::WriteFailed(message))
            }
            StorageError::Corrupt { .. } => Error::Store(StoreError::Corrupt(message)),
            StorageError::WriterClosed(_) => Error::Store(StoreError::WriterUnavailable(message)),
        }
    }
}
