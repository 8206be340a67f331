//! Identifier sanitizer errors.

use super::error_code::{self, ErrorCode};

/// Raised before any introspection command is built from a rejected name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    #[error("Invalid identifier: {identifier:?}")]
    Invalid { identifier: String },
}

impl ErrorCode for IdentifierError {
    fn error_code(&self) -> &'static str {
        error_code::INVALID_IDENTIFIER
    }
}
