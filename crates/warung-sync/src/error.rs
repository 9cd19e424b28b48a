//! # Replication Error Types
//!
//! Errors internal to the relay. None of these ever reach a checkout
//! caller: the relay logs them and moves on.

use thiserror::Error;

/// Replication relay errors.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The document store rejected or failed a request.
    #[error("Document store request failed: {0}")]
    Store(String),

    /// The document store returned a non-success status.
    #[error("Document store returned {status}: {body}")]
    StoreStatus { status: u16, body: String },

    /// Payload (de)serialization failed.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Mirror-id writeback to the local database failed.
    #[error("Mirror-id writeback failed: {0}")]
    Writeback(#[from] warung_db::DbError),

    /// An internal channel closed unexpectedly.
    #[error("Channel error: {0}")]
    Channel(String),
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::Store(err.to_string())
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
