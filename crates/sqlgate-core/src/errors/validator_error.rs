//! Validator invocation errors.

use super::error_code::{self, ErrorCode};

/// A validator failed while running, as opposed to returning `false`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidatorError {
    #[error("{message}")]
    Failed { message: String },

    #[error("validator panicked: {message}")]
    Panicked { message: String },
}

impl ErrorCode for ValidatorError {
    fn error_code(&self) -> &'static str {
        error_code::VALIDATOR_ERROR
    }
}
