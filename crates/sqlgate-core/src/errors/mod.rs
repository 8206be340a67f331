//! Error handling for sqlgate.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod error_code;
pub mod gate_error;
pub mod identifier_error;
pub mod progress_error;
pub mod storage_error;
pub mod submission_error;
pub mod validator_error;

pub use config_error::ConfigError;
pub use error_code::ErrorCode;
pub use gate_error::GateError;
pub use identifier_error::IdentifierError;
pub use progress_error::ProgressError;
pub use storage_error::StorageError;
pub use submission_error::{SubmissionError, SubmissionResult};
pub use validator_error::ValidatorError;
