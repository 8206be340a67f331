//! Fixed engine messages shown to the learner.

use sqlgate_core::RejectionReason;

pub const EMPTY_STATEMENT: &str = "Enter a SQL command.";
pub const SELECT_NOT_SUPPORTED: &str = "SELECT is not supported in this phase.";
pub const UNRECOGNIZED_OPERATION: &str = "Unrecognized operation.";
pub const OBJECTIVE_NOT_MET: &str =
    "✖ The command did not meet the objective. Changes were rolled back.";

/// Message for a statement refused before execution.
pub fn rejection(reason: &RejectionReason) -> String {
    match reason {
        RejectionReason::SelectNotSupported => SELECT_NOT_SUPPORTED.to_string(),
        RejectionReason::Unrecognized { .. } => UNRECOGNIZED_OPERATION.to_string(),
        RejectionReason::NotAllowed { allowed, .. } => {
            format!("This phase only accepts {allowed}.")
        }
    }
}

/// Message for a submission that errored.
pub fn error(message: &str) -> String {
    format!("Error: {message}")
}
