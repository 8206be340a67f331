//! # sqlgate-storage
//!
//! SQLite persistence for the challenge verification engine.
//!
//! - `connection`: `ChallengeStore`, the single owned connection with pragmas
//! - `schema`: `SchemaInspector`, read-only catalog queries
//! - `gate`: `TransactionGate`, begin/execute/commit-or-rollback per statement

pub mod connection;
pub mod gate;
pub mod schema;

pub use connection::ChallengeStore;
pub use gate::{GateState, TransactionGate};
pub use schema::{ForeignKeyRef, SchemaInspector, TableColumn, UniqueIndex};

use sqlgate_core::errors::StorageError;

/// Map a rusqlite error into the storage error type.
pub(crate) fn to_storage_err(e: rusqlite::Error) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}
