//! CloseTimer: a cancellable delayed action on the tokio runtime.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Identifies one scheduled close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseHandle(u64);

struct Pending {
    id: u64,
    task: JoinHandle<()>,
}

/// Holds at most one pending close. Scheduling a new one cancels the old.
pub struct CloseTimer {
    runtime: Handle,
    pending: Option<Pending>,
    next_id: u64,
}

impl CloseTimer {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            pending: None,
            next_id: 0,
        }
    }

    /// Run `action` after `delay` unless cancelled first.
    pub fn schedule<F>(&mut self, delay: Duration, action: F) -> CloseHandle
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel_pending();
        self.next_id += 1;
        let id = self.next_id;
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });
        tracing::debug!(delay_ms = delay.as_millis() as u64, "close scheduled");
        self.pending = Some(Pending { id, task });
        CloseHandle(id)
    }

    /// Cancel `handle` if it is still the pending close. Returns true if
    /// something was cancelled.
    pub fn cancel(&mut self, handle: CloseHandle) -> bool {
        match &self.pending {
            Some(p) if p.id == handle.0 => self.cancel_pending(),
            _ => false,
        }
    }

    /// Cancel whatever close is pending.
    pub fn cancel_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(p) if !p.task.is_finished() => {
                p.task.abort();
                tracing::debug!("pending close cancelled");
                true
            }
            _ => false,
        }
    }

    /// True while a scheduled close has not yet run or been cancelled.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.task.is_finished())
    }
}

impl Drop for CloseTimer {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
