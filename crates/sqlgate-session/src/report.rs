//! What a submission produced.

use serde::Serialize;
use sqlgate_core::errors::SubmissionError;

/// Where a submission ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubmissionState {
    /// Nothing but whitespace was submitted.
    Empty,
    OperationRejected,
    Committed,
    RolledBack,
    Errored,
}

/// The result of executing one statement. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionOutcome {
    pub affected_row_count: i64,
    pub committed: bool,
    pub error_message: Option<String>,
}

/// Everything the controller knows about one submission.
#[derive(Debug)]
pub struct SubmissionReport {
    pub state: SubmissionState,
    /// The classified leading keyword (empty for `Empty`).
    pub operation: String,
    /// Present once the statement reached the store.
    pub execution: Option<ExecutionOutcome>,
    /// Present for `OperationRejected` and `Errored`.
    pub error: Option<SubmissionError>,
    /// The text handed to the presenter.
    pub feedback: String,
    pub close_scheduled: bool,
}

impl SubmissionReport {
    pub fn committed(&self) -> bool {
        self.state == SubmissionState::Committed
    }

    pub fn affected_row_count(&self) -> Option<i64> {
        self.execution.as_ref().map(|e| e.affected_row_count)
    }
}
