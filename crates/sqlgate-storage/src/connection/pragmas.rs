//! PRAGMA configuration applied to the challenge store connection.
//!
//! Configured journal mode, NORMAL sync, foreign_keys ON, bounded busy_timeout.

use std::time::Duration;

use rusqlite::Connection;
use sqlgate_core::config::StorageConfig;
use sqlgate_core::errors::StorageError;

/// Apply safety pragmas to a connection.
pub fn apply_pragmas(conn: &Connection, config: &StorageConfig) -> Result<(), StorageError> {
    conn.execute_batch(&format!(
        "
        PRAGMA journal_mode = {};
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        ",
        config.effective_journal_mode().as_pragma()
    ))
    .map_err(|e| StorageError::SqliteError {
        message: format!("failed to apply pragmas: {e}"),
    })?;

    conn.busy_timeout(Duration::from_millis(config.effective_busy_timeout_ms()))
        .map_err(|e| StorageError::SqliteError {
            message: format!("failed to set busy_timeout: {e}"),
        })?;

    Ok(())
}

/// Verify that referential integrity enforcement is active.
pub fn verify_foreign_keys(conn: &Connection) -> Result<bool, StorageError> {
    let on: i64 = conn
        .pragma_query_value(None, "foreign_keys", |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
    Ok(on == 1)
}

/// Read back the journal mode actually in effect.
pub fn journal_mode(conn: &Connection) -> Result<String, StorageError> {
    conn.pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}
