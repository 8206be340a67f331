//! ErrorCode trait for structured error reporting.

/// Every error enum implements this to expose a stable code string
/// alongside its human-readable message.
pub trait ErrorCode {
    /// Returns the error code string (e.g., "EXECUTION_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const INVALID_IDENTIFIER: &str = "INVALID_IDENTIFIER";
pub const OPERATION_REJECTED: &str = "OPERATION_REJECTED";
pub const EXECUTION_ERROR: &str = "EXECUTION_ERROR";
pub const VALIDATOR_ERROR: &str = "VALIDATOR_ERROR";
pub const TRANSACTION_ERROR: &str = "TRANSACTION_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const DB_BUSY: &str = "DB_BUSY";
pub const PROGRESS_ERROR: &str = "PROGRESS_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
