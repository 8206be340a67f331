//! Transaction gate errors.

use super::error_code::{self, ErrorCode};

/// Errors raised while driving a statement through begin/execute/commit.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("a transaction is already open")]
    AlreadyOpen,

    #[error("no transaction is open")]
    NotOpen,

    #[error("failed to begin transaction: {message}")]
    BeginFailed { message: String },

    #[error("failed to commit: {message}")]
    CommitFailed { message: String },

    #[error("failed to roll back: {message}")]
    RollbackFailed { message: String },

    /// The submitted statement itself failed; carries the store's message verbatim.
    #[error("{message}")]
    Execution { message: String },
}

impl ErrorCode for GateError {
    fn error_code(&self) -> &'static str {
        match self {
            GateError::Execution { .. } => error_code::EXECUTION_ERROR,
            _ => error_code::TRANSACTION_ERROR,
        }
    }
}
