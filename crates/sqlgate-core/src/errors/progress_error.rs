//! Progress persistence errors.

use super::error_code::{self, ErrorCode};

/// Raised by a progress tracker that could not record a completed challenge.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("failed to save progress for challenge {index}: {reason}")]
    SaveFailed { index: usize, reason: String },

    #[error("challenge index {index} out of range (slots: {slots})")]
    OutOfRange { index: usize, slots: usize },
}

impl ErrorCode for ProgressError {
    fn error_code(&self) -> &'static str {
        error_code::PROGRESS_ERROR
    }
}
