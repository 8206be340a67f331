//! Session controller tests: one statement in, exactly one outcome out.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sqlgate_core::config::{ConsoleConfig, StorageConfig};
use sqlgate_core::errors::{ProgressError, SubmissionError, ValidatorError};
use sqlgate_core::{Operation, RejectionReason};
use sqlgate_session::feedback;
use sqlgate_session::{
    ChallengeSession, InMemoryProgress, Presenter, ProgressTracker, SessionController,
    SubmissionState, Validator,
};
use sqlgate_storage::ChallengeStore;
use tokio::runtime::Handle;

#[derive(Default)]
struct RecordingPresenter {
    messages: Mutex<Vec<String>>,
    closes: AtomicUsize,
}

impl RecordingPresenter {
    fn last_message(&self) -> Option<String> {
        self.messages.lock().unwrap().last().cloned()
    }

    fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Presenter for RecordingPresenter {
    fn report_feedback(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn request_close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

struct BrokenProgress;

impl ProgressTracker for BrokenProgress {
    fn mark_challenge_complete(&self, index: usize) -> Result<(), ProgressError> {
        Err(ProgressError::SaveFailed {
            index,
            reason: "disk full".to_string(),
        })
    }
}

struct Harness {
    store: Arc<ChallengeStore>,
    presenter: Arc<RecordingPresenter>,
    progress: Arc<InMemoryProgress>,
    controller: SessionController,
}

const FAST_CLOSE: ConsoleConfig = ConsoleConfig {
    default_success_message: None,
    default_close_delay_ms: Some(20),
    max_close_delay_ms: Some(200),
};

fn harness(setup: &str) -> Harness {
    sqlgate_core::tracing::init_tracing();
    let store = Arc::new(ChallengeStore::open_in_memory(&StorageConfig::default()).unwrap());
    store.execute_setup(setup).unwrap();
    let presenter = Arc::new(RecordingPresenter::default());
    let progress = Arc::new(InMemoryProgress::new(8));
    let controller = SessionController::new(
        Arc::clone(&store),
        Arc::clone(&presenter) as Arc<dyn Presenter>,
        Arc::clone(&progress) as Arc<dyn ProgressTracker>,
        Handle::current(),
    )
    .with_console_config(FAST_CLOSE);
    Harness {
        store,
        presenter,
        progress,
        controller,
    }
}

fn rows(store: &ChallengeStore, table: &str) -> i64 {
    store.with_schema(|s| s.row_count(table)).unwrap()
}

fn in_transaction(store: &ChallengeStore) -> bool {
    store
        .with_conn(|conn| Ok::<_, sqlgate_core::errors::StorageError>(!conn.is_autocommit()))
        .unwrap()
}

#[tokio::test]
async fn create_table_commits_and_schedules_close() {
    let mut h = harness("");
    h.controller.open_phase(
        ChallengeSession::builder()
            .allow(Operation::Create)
            .validator(Validator::with_schema(|_, _, schema| Ok(schema.table_exists("t")?)))
            .challenge_index(0)
            .build(),
    );

    let report = h.controller.submit("CREATE TABLE t (id INTEGER)");
    assert_eq!(report.state, SubmissionState::Committed);
    assert_eq!(report.operation, "CREATE");
    assert_eq!(report.affected_row_count(), Some(0));
    assert!(report.close_scheduled);
    assert_eq!(
        h.presenter.last_message().as_deref(),
        Some("Congratulations, you completed the challenge!")
    );
    assert!(h.store.with_schema(|s| s.table_exists("t")).unwrap());
    assert!(h.progress.is_complete(0));
    assert!(h.controller.close_pending());

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(h.presenter.closes(), 1);
    assert!(!h.controller.is_open());
}

#[tokio::test]
async fn insert_that_misses_target_rolls_back() {
    let mut h = harness("CREATE TABLE t (id INTEGER);");
    h.controller.open_phase(
        ChallengeSession::builder()
            .allow(Operation::Insert)
            .validator(Validator::with_schema(|_, _, schema| {
                Ok(schema.scalar_count("SELECT COUNT(*) FROM t")? == 3)
            }))
            .challenge_index(1)
            .build(),
    );

    let report = h.controller.submit("INSERT INTO t VALUES (1)");
    assert_eq!(report.state, SubmissionState::RolledBack);
    assert_eq!(report.affected_row_count(), Some(1));
    assert!(!report.close_scheduled);
    assert_eq!(h.presenter.last_message().as_deref(), Some(feedback::OBJECTIVE_NOT_MET));
    assert_eq!(rows(&h.store, "t"), 0);
    assert!(!h.progress.is_complete(1));
    assert!(!h.controller.close_pending());
    assert!(h.controller.is_open());
}

#[tokio::test]
async fn select_is_rejected_under_any_session() {
    let mut h = harness("CREATE TABLE t (id INTEGER);");
    for session in [
        ChallengeSession::unrestricted(None),
        ChallengeSession::builder().allow(Operation::Insert).build(),
    ] {
        h.controller.open_phase(session);
        let report = h.controller.submit("  select * from t");
        assert_eq!(report.state, SubmissionState::OperationRejected);
        assert!(report.execution.is_none());
        assert!(matches!(
            report.error,
            Some(SubmissionError::OperationRejected(RejectionReason::SelectNotSupported))
        ));
        assert_eq!(report.feedback, feedback::SELECT_NOT_SUPPORTED);
        assert!(!in_transaction(&h.store));
    }
}

#[tokio::test]
async fn whitelist_mismatch_is_rejected_without_execution() {
    let mut h = harness("CREATE TABLE t (id INTEGER); INSERT INTO t VALUES (1);");
    h.controller
        .open_phase(ChallengeSession::builder().allow(Operation::Update).build());

    let report = h.controller.submit("DELETE FROM t");
    assert_eq!(report.state, SubmissionState::OperationRejected);
    assert_eq!(report.feedback, "This phase only accepts UPDATE.");
    assert_eq!(rows(&h.store, "t"), 1);
}

#[tokio::test]
async fn unrecognized_operation_is_rejected() {
    let mut h = harness("");
    h.controller.open_unrestricted(None);
    let report = h.controller.submit("PRAGMA foreign_keys = OFF");
    assert_eq!(report.state, SubmissionState::OperationRejected);
    assert_eq!(report.operation, "PRAGMA");
    assert_eq!(report.feedback, feedback::UNRECOGNIZED_OPERATION);
}

#[tokio::test]
async fn empty_statement_prompts_for_input() {
    let mut h = harness("");
    h.controller.open_unrestricted(None);
    let report = h.controller.submit("   \n\t ");
    assert_eq!(report.state, SubmissionState::Empty);
    assert_eq!(h.presenter.last_message().as_deref(), Some(feedback::EMPTY_STATEMENT));
}

#[tokio::test]
async fn affected_counts_reach_the_validator() {
    let mut h = harness(
        "CREATE TABLE t (id INTEGER, v TEXT); INSERT INTO t VALUES (1,'a'),(2,'a'),(3,'b');",
    );
    h.controller.open_phase(
        ChallengeSession::builder()
            .allow(Operation::Update)
            .validator(Validator::expect_affected(2))
            .auto_close_on_success(false)
            .build(),
    );
    let report = h.controller.submit("UPDATE t SET v = 'c' WHERE v = 'a'");
    assert_eq!(report.state, SubmissionState::Committed);
    assert_eq!(report.affected_row_count(), Some(2));
    assert!(!report.close_scheduled);
    assert!(!h.controller.close_pending());
}

#[tokio::test]
async fn execution_error_is_reported_and_rolled_back() {
    let mut h = harness("CREATE TABLE t (id INTEGER PRIMARY KEY); INSERT INTO t VALUES (1);");
    h.controller.open_unrestricted(None);
    let report = h.controller.submit("INSERT INTO t VALUES (1)");
    assert_eq!(report.state, SubmissionState::Errored);
    assert!(matches!(report.error, Some(SubmissionError::Execution { .. })));
    let execution = report.execution.as_ref().unwrap();
    assert!(!execution.committed);
    assert!(execution.error_message.is_some());
    assert!(report.feedback.starts_with("Error: "));
    assert!(report.feedback.contains("UNIQUE"));
    assert!(!in_transaction(&h.store));
    assert_eq!(rows(&h.store, "t"), 1);
}

#[tokio::test]
async fn validator_failure_rolls_back() {
    let mut h = harness("CREATE TABLE t (id INTEGER);");
    h.controller.open_unrestricted(Some(Validator::basic(|_, _| Err("boom".into()))));
    let report = h.controller.submit("INSERT INTO t VALUES (1)");
    assert_eq!(report.state, SubmissionState::Errored);
    assert!(matches!(
        report.error,
        Some(SubmissionError::ValidatorInvocation(ValidatorError::Failed { .. }))
    ));
    assert_eq!(report.feedback, "Error: boom");
    assert_eq!(rows(&h.store, "t"), 0);
    assert!(!in_transaction(&h.store));
}

#[tokio::test]
async fn validator_panic_rolls_back() {
    let mut h = harness("CREATE TABLE t (id INTEGER);");
    h.controller
        .open_unrestricted(Some(Validator::count_only(|_| panic!("validator bug"))));
    let report = h.controller.submit("INSERT INTO t VALUES (1)");
    assert!(matches!(
        report.error,
        Some(SubmissionError::ValidatorInvocation(ValidatorError::Panicked { .. }))
    ));
    assert_eq!(rows(&h.store, "t"), 0);
    assert!(!in_transaction(&h.store));

    // The controller stays usable afterwards.
    h.controller.open_unrestricted(None);
    assert!(h.controller.submit("INSERT INTO t VALUES (2)").committed());
}

#[tokio::test]
async fn progress_failure_keeps_commit() {
    let store = Arc::new(ChallengeStore::open_in_memory(&StorageConfig::default()).unwrap());
    store.execute_setup("CREATE TABLE t (id INTEGER);").unwrap();
    let presenter = Arc::new(RecordingPresenter::default());
    let mut controller = SessionController::new(
        Arc::clone(&store),
        presenter,
        Arc::new(BrokenProgress),
        Handle::current(),
    );
    controller.open_phase(
        ChallengeSession::builder()
            .challenge_index(2)
            .auto_close_on_success(false)
            .build(),
    );
    let report = controller.submit("INSERT INTO t VALUES (1)");
    assert_eq!(report.state, SubmissionState::Committed);
    assert_eq!(rows(&store, "t"), 1);
}

#[tokio::test]
async fn out_of_range_progress_slot_keeps_commit() {
    let mut h = harness("CREATE TABLE t (id INTEGER);");
    h.controller.open_phase(
        ChallengeSession::builder()
            .challenge_index(99)
            .auto_close_on_success(false)
            .build(),
    );
    assert!(h.controller.submit("INSERT INTO t VALUES (1)").committed());
    assert_eq!(h.progress.completed_count(), 0);
}

#[tokio::test]
async fn custom_success_message_wins() {
    let mut h = harness("");
    h.controller.open_phase(
        ChallengeSession::builder()
            .success_message("Table built.")
            .auto_close_on_success(false)
            .build(),
    );
    h.controller.submit("CREATE TABLE t (id INTEGER)");
    assert_eq!(h.presenter.last_message().as_deref(), Some("Table built."));
}

#[tokio::test]
async fn opening_new_phase_cancels_pending_close() {
    let mut h = harness("");
    h.controller.open_unrestricted(None);
    assert!(h.controller.submit("CREATE TABLE a (id INTEGER)").close_scheduled);
    assert!(h.controller.close_pending());

    h.controller
        .open_phase(ChallengeSession::builder().allow(Operation::Insert).build());
    assert!(!h.controller.close_pending());

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(h.presenter.closes(), 0);
    assert!(h.controller.is_open());
    assert_eq!(
        h.controller.active_session().and_then(|s| s.allowed_operation().cloned()),
        Some(Operation::Insert)
    );
}

#[tokio::test]
async fn manual_close_cancels_timer_and_clears_phase() {
    let mut h = harness("");
    h.controller.open_unrestricted(None);
    h.controller.submit("CREATE TABLE a (id INTEGER)");
    h.controller.close();
    assert!(!h.controller.is_open());
    assert!(!h.controller.close_pending());
    assert_eq!(h.presenter.closes(), 1);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(h.presenter.closes(), 1);
}

#[tokio::test]
async fn submission_without_phase_is_unrestricted() {
    let mut h = harness("CREATE TABLE t (id INTEGER);");
    assert!(!h.controller.is_open());
    let report = h.controller.submit("INSERT INTO t VALUES (1)");
    assert_eq!(report.state, SubmissionState::Committed);
    assert_eq!(rows(&h.store, "t"), 1);
}

#[tokio::test]
async fn statement_is_trimmed_before_execution() {
    let mut h = harness("CREATE TABLE t (id INTEGER);");
    h.controller.open_phase(
        ChallengeSession::builder()
            .allow(Operation::Insert)
            .validator(Validator::basic(|statement, _| Ok(statement == "INSERT INTO t VALUES (1)")))
            .auto_close_on_success(false)
            .build(),
    );
    assert!(h.controller.submit("\n  INSERT INTO t VALUES (1)  \n").committed());
}

#[tokio::test]
async fn only_committed_statements_reach_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("challenge.db");
    let config = StorageConfig::default();
    {
        let store = Arc::new(ChallengeStore::open(&path, &config).unwrap());
        store.execute_setup("CREATE TABLE t (id INTEGER);").unwrap();
        let mut controller = SessionController::new(
            Arc::clone(&store),
            Arc::new(RecordingPresenter::default()),
            Arc::new(InMemoryProgress::new(1)),
            Handle::current(),
        );
        controller.open_phase(
            ChallengeSession::builder()
                .allow(Operation::Insert)
                .validator(Validator::expect_affected(2))
                .auto_close_on_success(false)
                .build(),
        );
        assert!(!controller.submit("INSERT INTO t VALUES (1)").committed());
        assert!(controller.submit("INSERT INTO t VALUES (2), (3)").committed());
    }

    let reopened = ChallengeStore::open(&path, &config).unwrap();
    assert_eq!(rows(&reopened, "t"), 2);
    reopened.close().unwrap();
}
