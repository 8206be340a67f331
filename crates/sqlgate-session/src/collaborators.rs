//! Outward-facing collaborators injected into the session controller.

use std::sync::Mutex;

use sqlgate_core::errors::ProgressError;

/// The presentation layer: shows outcome text and tears down the phase UI.
pub trait Presenter: Send + Sync {
    fn report_feedback(&self, message: &str);
    fn request_close(&self);
}

/// Records completed challenges. Failures are logged by the caller and
/// never undo a commit.
pub trait ProgressTracker: Send + Sync {
    fn mark_challenge_complete(&self, index: usize) -> Result<(), ProgressError>;
}

/// Fixed-size completion flags kept in memory.
pub struct InMemoryProgress {
    slots: Mutex<Vec<bool>>,
}

impl InMemoryProgress {
    pub fn new(slots: usize) -> Self {
        Self {
            slots: Mutex::new(vec![false; slots]),
        }
    }

    pub fn is_complete(&self, index: usize) -> bool {
        self.slots
            .lock()
            .map(|s| s.get(index).copied().unwrap_or(false))
            .unwrap_or(false)
    }

    pub fn completed_count(&self) -> usize {
        self.slots
            .lock()
            .map(|s| s.iter().filter(|done| **done).count())
            .unwrap_or(0)
    }
}

impl ProgressTracker for InMemoryProgress {
    fn mark_challenge_complete(&self, index: usize) -> Result<(), ProgressError> {
        let mut slots = self.slots.lock().map_err(|_| ProgressError::SaveFailed {
            index,
            reason: "progress lock poisoned".to_string(),
        })?;
        let len = slots.len();
        let slot = slots
            .get_mut(index)
            .ok_or(ProgressError::OutOfRange { index, slots: len })?;
        *slot = true;
        Ok(())
    }
}
