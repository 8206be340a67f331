//! SessionController: owns the active phase and runs each submitted
//! statement through classify → authorize → execute → validate → commit
//! or roll back.
//!
//! Submission is synchronous; the only deferred work is the auto-close
//! after a successful phase, which a newer phase or a manual close cancels.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use sqlgate_core::config::ConsoleConfig;
use sqlgate_core::errors::{StorageError, SubmissionError};
use sqlgate_core::operation::{classify, Operation};
use sqlgate_storage::{ChallengeStore, TransactionGate};
use tokio::runtime::Handle;

use crate::collaborators::{Presenter, ProgressTracker};
use crate::feedback;
use crate::report::{ExecutionOutcome, SubmissionReport, SubmissionState};
use crate::session::ChallengeSession;
use crate::timer::CloseTimer;
use crate::validator::{self, Validator};

/// The active phase plus a generation counter. Every open or close bumps the
/// generation, so a close timer armed for an older phase finds a mismatch
/// and does nothing.
#[derive(Default)]
struct PhaseSlot {
    generation: u64,
    session: Option<ChallengeSession>,
}

/// Result of one trip through the transaction gate.
struct GateRun {
    affected: Option<i64>,
    verdict: Result<bool, SubmissionError>,
}

pub struct SessionController {
    store: Arc<ChallengeStore>,
    presenter: Arc<dyn Presenter>,
    progress: Arc<dyn ProgressTracker>,
    console: ConsoleConfig,
    phase: Arc<Mutex<PhaseSlot>>,
    timer: CloseTimer,
}

impl SessionController {
    pub fn new(
        store: Arc<ChallengeStore>,
        presenter: Arc<dyn Presenter>,
        progress: Arc<dyn ProgressTracker>,
        runtime: Handle,
    ) -> Self {
        Self {
            store,
            presenter,
            progress,
            console: ConsoleConfig::default(),
            phase: Arc::new(Mutex::new(PhaseSlot::default())),
            timer: CloseTimer::new(runtime),
        }
    }

    pub fn with_console_config(mut self, console: ConsoleConfig) -> Self {
        self.console = console;
        self
    }

    /// Make `session` the active phase, discarding the previous one and any
    /// close it had pending.
    pub fn open_phase(&mut self, session: ChallengeSession) {
        self.timer.cancel_pending();
        let mut slot = self.lock_phase();
        slot.generation += 1;
        tracing::debug!(
            generation = slot.generation,
            allowed = ?session.allowed_operation(),
            challenge_index = ?session.challenge_index(),
            "phase opened"
        );
        slot.session = Some(session);
    }

    /// Open a phase that accepts any DDL/DML statement.
    pub fn open_unrestricted(&mut self, validator: Option<Validator>) {
        self.open_phase(ChallengeSession::unrestricted(validator));
    }

    /// Close the active phase now.
    pub fn close(&mut self) {
        self.timer.cancel_pending();
        {
            let mut slot = self.lock_phase();
            slot.generation += 1;
            slot.session = None;
        }
        tracing::debug!("phase closed");
        self.presenter.request_close();
    }

    /// A copy of the active phase, if any.
    pub fn active_session(&self) -> Option<ChallengeSession> {
        self.lock_phase().session.clone()
    }

    pub fn is_open(&self) -> bool {
        self.lock_phase().session.is_some()
    }

    /// True while an auto-close is waiting to fire.
    pub fn close_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Run one statement against the active phase and report the outcome to
    /// the presenter. Never leaves a transaction open.
    pub fn submit(&mut self, statement: &str) -> SubmissionReport {
        let report = self.evaluate(statement.trim());
        self.presenter.report_feedback(&report.feedback);
        report
    }

    fn evaluate(&mut self, statement: &str) -> SubmissionReport {
        if statement.is_empty() {
            return SubmissionReport {
                state: SubmissionState::Empty,
                operation: String::new(),
                execution: None,
                error: None,
                feedback: feedback::EMPTY_STATEMENT.to_string(),
                close_scheduled: false,
            };
        }

        let (session, generation) = {
            let slot = self.lock_phase();
            let session = slot
                .session
                .clone()
                .unwrap_or_else(|| ChallengeSession::unrestricted(None));
            (session, slot.generation)
        };

        let token = classify(statement);
        if let Err(reason) = Operation::from_token(&token).authorize(session.allowed_operation()) {
            tracing::warn!(operation = %token, %reason, "statement rejected");
            return SubmissionReport {
                state: SubmissionState::OperationRejected,
                operation: token,
                execution: None,
                feedback: feedback::rejection(&reason),
                error: Some(SubmissionError::OperationRejected(reason)),
                close_scheduled: false,
            };
        }

        let run = self
            .store
            .with_conn(|conn| Ok::<_, StorageError>(run_gate(conn, statement, &session)))
            .unwrap_or_else(|e| GateRun {
                affected: None,
                verdict: Err(e.into()),
            });

        match run.verdict {
            Ok(true) => self.on_committed(&token, &session, generation, run.affected.unwrap_or(0)),
            Ok(false) => {
                let affected = run.affected.unwrap_or(0);
                tracing::warn!(operation = %token, affected, "validator rejected statement, rolled back");
                SubmissionReport {
                    state: SubmissionState::RolledBack,
                    operation: token,
                    execution: Some(ExecutionOutcome {
                        affected_row_count: affected,
                        committed: false,
                        error_message: None,
                    }),
                    error: None,
                    feedback: feedback::OBJECTIVE_NOT_MET.to_string(),
                    close_scheduled: false,
                }
            }
            Err(error) => {
                log_failure(&token, &error);
                let message = error.to_string();
                let reached_store =
                    run.affected.is_some() || matches!(error, SubmissionError::Execution { .. });
                SubmissionReport {
                    state: SubmissionState::Errored,
                    operation: token,
                    execution: reached_store.then(|| ExecutionOutcome {
                        affected_row_count: run.affected.unwrap_or(0),
                        committed: false,
                        error_message: Some(message.clone()),
                    }),
                    error: Some(error),
                    feedback: feedback::error(&message),
                    close_scheduled: false,
                }
            }
        }
    }

    fn on_committed(
        &mut self,
        token: &str,
        session: &ChallengeSession,
        generation: u64,
        affected: i64,
    ) -> SubmissionReport {
        tracing::info!(operation = %token, affected, "statement committed");

        if let Some(index) = session.challenge_index() {
            if let Err(e) = self.progress.mark_challenge_complete(index) {
                tracing::warn!(challenge_index = index, error = %e, "failed to save progress");
            }
        }

        let close_scheduled = session.auto_close_on_success();
        if close_scheduled {
            let delay = self.console.resolve_close_delay(session.auto_close_delay());
            let phase = Arc::clone(&self.phase);
            let presenter = Arc::clone(&self.presenter);
            self.timer.schedule(delay, move || {
                let fire = match phase.lock() {
                    Ok(mut slot) if slot.generation == generation => {
                        slot.generation += 1;
                        slot.session = None;
                        true
                    }
                    _ => false,
                };
                if fire {
                    tracing::debug!("auto-close fired");
                    presenter.request_close();
                }
            });
        }

        let message = session
            .success_message()
            .unwrap_or_else(|| self.console.effective_success_message())
            .to_string();

        SubmissionReport {
            state: SubmissionState::Committed,
            operation: token.to_string(),
            execution: Some(ExecutionOutcome {
                affected_row_count: affected,
                committed: true,
                error_message: None,
            }),
            error: None,
            feedback: message,
            close_scheduled,
        }
    }

    fn lock_phase(&self) -> std::sync::MutexGuard<'_, PhaseSlot> {
        // The slot holds plain data, so a poisoned lock is still usable.
        self.phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// begin → execute → validate → commit or roll back, on one connection.
fn run_gate(conn: &Connection, statement: &str, session: &ChallengeSession) -> GateRun {
    let mut gate = TransactionGate::new(conn);

    if let Err(e) = gate.begin() {
        return GateRun {
            affected: None,
            verdict: Err(e.into()),
        };
    }

    // A failed statement has already been rolled back by the gate.
    let affected = match gate.execute(statement) {
        Ok(affected) => affected,
        Err(e) => {
            return GateRun {
                affected: None,
                verdict: Err(e.into()),
            }
        }
    };

    let verdict = match validator::dispatch(session.validator(), statement, affected, &gate.schema()) {
        Ok(true) => gate.commit().map(|()| true).map_err(SubmissionError::from),
        Ok(false) => gate.rollback().map(|()| false).map_err(SubmissionError::from),
        Err(e) => Err(e.into()),
    };

    if verdict.is_err() && gate.state().is_open() {
        if let Err(e) = gate.rollback() {
            tracing::warn!(error = %e, "best-effort rollback failed");
        }
    }

    GateRun {
        affected: Some(affected),
        verdict,
    }
}

fn log_failure(token: &str, error: &SubmissionError) {
    match error {
        SubmissionError::ValidatorInvocation(e) => {
            tracing::error!(operation = %token, error = %e, "validator failed, rolled back");
        }
        SubmissionError::Execution { message } => {
            tracing::error!(operation = %token, error = %message, "statement failed, rolled back");
        }
        other => {
            tracing::error!(operation = %token, error = %other, "transaction error");
        }
    }
}
