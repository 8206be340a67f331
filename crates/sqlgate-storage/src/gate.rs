//! TransactionGate: runs one submitted statement inside a transaction whose
//! fate is decided afterwards.
//!
//! `Idle → Began → Executed → {Committed | RolledBack}`. The statement's
//! effect stays visible to the validator (through `schema()`) until the
//! caller commits or rolls back. A gate dropped while still open rolls back,
//! so no submission can leave a transaction behind.

use rusqlite::Connection;
use sqlgate_core::errors::GateError;

use crate::schema::SchemaInspector;

/// Where a gate is in its single begin-to-terminal cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Began,
    Executed,
    Committed,
    RolledBack,
}

impl GateState {
    /// True while a transaction is open on the connection.
    pub fn is_open(self) -> bool {
        matches!(self, GateState::Began | GateState::Executed)
    }
}

/// Drives one statement through begin/execute/commit-or-rollback.
pub struct TransactionGate<'c> {
    conn: &'c Connection,
    state: GateState,
}

impl<'c> TransactionGate<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            state: GateState::Idle,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Start the transaction. Fails if this gate already ran a cycle or if
    /// the connection already has a transaction open.
    pub fn begin(&mut self) -> Result<(), GateError> {
        if self.state != GateState::Idle || !self.conn.is_autocommit() {
            return Err(GateError::AlreadyOpen);
        }
        // IMMEDIATE takes the write lock up front; a contended lock fails
        // after busy_timeout instead of midway through the statement.
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| GateError::BeginFailed {
                message: e.to_string(),
            })?;
        self.state = GateState::Began;
        tracing::debug!("transaction began");
        Ok(())
    }

    /// Execute the statement and return the number of rows it inserted,
    /// updated or deleted. DDL reports 0.
    ///
    /// On failure the transaction is rolled back before the store's message
    /// is returned.
    pub fn execute(&mut self, sql: &str) -> Result<i64, GateError> {
        if self.state != GateState::Began {
            return Err(GateError::NotOpen);
        }

        let affected = self
            .run(sql)
            .map_err(|e| GateError::Execution {
                message: e.to_string(),
            });

        match affected {
            Ok(affected) => {
                self.state = GateState::Executed;
                tracing::debug!(affected, "statement executed");
                Ok(affected)
            }
            Err(e) => {
                if let Err(rollback_err) = self.rollback() {
                    tracing::warn!(error = %rollback_err, "rollback after failed statement also failed");
                }
                Err(e)
            }
        }
    }

    fn run(&self, sql: &str) -> rusqlite::Result<i64> {
        let total_before = self.total_changes()?;
        self.conn.execute(sql, [])?;
        // changes() keeps the count of the last DML statement, so a DDL
        // statement would otherwise report its predecessor's count.
        if self.total_changes()? == total_before {
            return Ok(0);
        }
        self.conn
            .query_row("SELECT changes()", [], |row| row.get(0))
    }

    fn total_changes(&self) -> rusqlite::Result<i64> {
        self.conn
            .query_row("SELECT total_changes()", [], |row| row.get(0))
    }

    /// Catalog access that sees this transaction's uncommitted effects.
    pub fn schema(&self) -> SchemaInspector<'c> {
        SchemaInspector::new(self.conn)
    }

    /// Keep the statement's effect. On failure the gate stays open so the
    /// caller can still roll back.
    pub fn commit(&mut self) -> Result<(), GateError> {
        if !self.state.is_open() {
            return Err(GateError::NotOpen);
        }
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| GateError::CommitFailed {
                message: e.to_string(),
            })?;
        self.state = GateState::Committed;
        tracing::debug!("transaction committed");
        Ok(())
    }

    /// Discard the statement's effect.
    pub fn rollback(&mut self) -> Result<(), GateError> {
        if !self.state.is_open() {
            return Err(GateError::NotOpen);
        }
        // The gate is terminal whatever ROLLBACK returns; SQLite may already
        // have rolled back on its own (e.g. after SQLITE_FULL).
        self.state = GateState::RolledBack;
        if self.conn.is_autocommit() {
            tracing::debug!("transaction already closed by SQLite");
            return Ok(());
        }
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| GateError::RollbackFailed {
                message: e.to_string(),
            })?;
        tracing::debug!("transaction rolled back");
        Ok(())
    }
}

impl Drop for TransactionGate<'_> {
    fn drop(&mut self) {
        if self.state.is_open() {
            tracing::warn!(state = ?self.state, "transaction gate dropped while open, rolling back");
            if let Err(e) = self.rollback() {
                tracing::error!(error = %e, "rollback on drop failed");
            }
        }
    }
}
