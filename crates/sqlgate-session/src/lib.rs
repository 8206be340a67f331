//! # sqlgate-session
//!
//! Challenge sessions for the verification engine.
//!
//! - `session`: `ChallengeSession`, one phase's rules, and `PhaseDefinition`
//! - `validator`: the three validator shapes and their dispatch
//! - `controller`: `SessionController`, the per-statement state machine
//! - `timer`: `CloseTimer`, the cancellable auto-close
//! - `collaborators`: the presenter and progress traits
//! - `feedback` / `report`: learner-facing messages and submission results

pub mod collaborators;
pub mod controller;
pub mod feedback;
pub mod report;
pub mod session;
pub mod timer;
pub mod validator;

pub use collaborators::{InMemoryProgress, Presenter, ProgressTracker};
pub use controller::SessionController;
pub use report::{ExecutionOutcome, SubmissionReport, SubmissionState};
pub use session::{ChallengeSession, ChallengeSessionBuilder, PhaseDefinition};
pub use timer::{CloseHandle, CloseTimer};
pub use validator::{Validator, ValidatorResult};
