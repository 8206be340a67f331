//! Connection management: one owned connection, serialized access.

pub mod pragmas;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;
use sqlgate_core::config::StorageConfig;
use sqlgate_core::errors::StorageError;

use self::pragmas::apply_pragmas;
use crate::schema::SchemaInspector;

/// The challenge database. Owns the single connection every submission,
/// validator and setup script goes through.
///
/// The connection is released when the store is dropped; `close` does the
/// same but reports a failing close instead of ignoring it.
pub struct ChallengeStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
    busy_timeout_ms: u64,
}

impl ChallengeStore {
    /// Open (or create) a file-backed store and apply pragmas.
    pub fn open(path: &Path, config: &StorageConfig) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|e| StorageError::SqliteError {
            message: format!("failed to open {}: {e}", path.display()),
        })?;
        apply_pragmas(&conn, config)?;
        tracing::info!(path = %path.display(), "challenge store opened");

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
            busy_timeout_ms: config.effective_busy_timeout_ms(),
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory(config: &StorageConfig) -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
        apply_pragmas(&conn, config)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
            busy_timeout_ms: config.effective_busy_timeout_ms(),
        })
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_conn<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<StorageError>,
    {
        let guard = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        f(&guard)
    }

    /// Run `f` with a schema inspector over the connection.
    pub fn with_schema<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&SchemaInspector<'_>) -> Result<T, StorageError>,
    {
        self.with_conn(|conn| f(&SchemaInspector::new(conn)))
    }

    /// Run an external setup script (schema creation, seed data).
    pub fn execute_setup(&self, script: &str) -> Result<(), StorageError> {
        let timeout_ms = self.busy_timeout_ms;
        self.with_conn(|conn| {
            conn.execute_batch(script).map_err(|e| {
                if e.sqlite_error_code() == Some(rusqlite::ErrorCode::DatabaseBusy) {
                    StorageError::DbBusy { timeout_ms }
                } else {
                    StorageError::SqliteError {
                        message: format!("setup script failed: {e}"),
                    }
                }
            })
        })
    }

    /// Get the database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The busy timeout this store was opened with.
    pub fn busy_timeout_ms(&self) -> u64 {
        self.busy_timeout_ms
    }

    /// Close the connection, surfacing any error from SQLite.
    pub fn close(self) -> Result<(), StorageError> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| StorageError::LockPoisoned)?;
        conn.close().map_err(|(_, e)| StorageError::SqliteError {
            message: format!("failed to close store: {e}"),
        })?;
        tracing::debug!("challenge store closed");
        Ok(())
    }
}
