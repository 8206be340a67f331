//! Storage-layer errors for SQLite operations.

use super::error_code::{self, ErrorCode};
use super::IdentifierError;

/// Errors raised by the store and the schema introspector.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Database busy: lock not acquired within {timeout_ms}ms")]
    DbBusy { timeout_ms: u64 },

    #[error("introspection query is not read-only: {query}")]
    NotReadOnly { query: String },

    #[error("connection lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierError),
}

impl ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            StorageError::DbBusy { .. } => error_code::DB_BUSY,
            StorageError::InvalidIdentifier(e) => e.error_code(),
            _ => error_code::STORAGE_ERROR,
        }
    }
}
