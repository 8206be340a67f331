//! Top-level submission error, the union of everything a statement
//! submission can run into before the controller turns it into feedback.

use super::error_code::{self, ErrorCode};
use super::{GateError, StorageError, ValidatorError};
use crate::operation::RejectionReason;

/// Everything that stops a submission short of a clean commit
/// (other than the validator saying no).
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("operation rejected: {0}")]
    OperationRejected(RejectionReason),

    #[error("{message}")]
    Execution { message: String },

    #[error(transparent)]
    ValidatorInvocation(#[from] ValidatorError),

    #[error(transparent)]
    Transaction(GateError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<GateError> for SubmissionError {
    fn from(e: GateError) -> Self {
        match e {
            GateError::Execution { message } => SubmissionError::Execution { message },
            other => SubmissionError::Transaction(other),
        }
    }
}

impl ErrorCode for SubmissionError {
    fn error_code(&self) -> &'static str {
        match self {
            SubmissionError::OperationRejected(_) => error_code::OPERATION_REJECTED,
            SubmissionError::Execution { .. } => error_code::EXECUTION_ERROR,
            SubmissionError::ValidatorInvocation(e) => e.error_code(),
            SubmissionError::Transaction(e) => e.error_code(),
            SubmissionError::Storage(e) => e.error_code(),
        }
    }
}

/// Convenience alias for submission results.
pub type SubmissionResult<T> = Result<T, SubmissionError>;
