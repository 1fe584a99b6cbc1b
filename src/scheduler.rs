//! Single-slot deferred task scheduler over a simulated clock.
//!
//! The scheduler owns zero or one pending task. Scheduling a new task always
//! drops the previous one, so callers can never hold two outstanding timers.
//! Time only moves when the owner calls [`Scheduler::advance_to`], which
//! keeps animation fully deterministic under test.

use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
struct Pending<T> {
    due: Duration,
    task: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scheduler<T> {
    now: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Scheduler {
            now: Duration::ZERO,
            pending: None,
        }
    }

    /// Current simulated time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Run `task` after `delay`, replacing any pending task
    pub fn schedule(&mut self, delay: Duration, task: T) {
        if self.pending.is_some() {
            debug!("replacing pending task");
        }
        let due = self.now + delay;
        debug!(due_ms = due.as_millis() as u64, "task scheduled");
        self.pending = Some(Pending { due, task });
    }

    /// Drop the pending task, returning it if there was one
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| {
            debug!("pending task cancelled");
            p.task
        })
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending task fires, if any
    pub fn due_at(&self) -> Option<Duration> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Move the clock towards `target`, stopping at the pending task's due time.
    ///
    /// Returns the task if it became due. Call repeatedly until it returns
    /// `None` to drain every firing up to `target`; a task scheduled while
    /// handling a firing is measured from that firing's due time.
    pub fn advance_to(&mut self, target: Duration) -> Option<T> {
        match self.pending.as_ref().map(|p| p.due) {
            Some(due) if due <= target => {
                self.now = self.now.max(due);
                self.pending.take().map(|p| p.task)
            }
            _ => {
                self.now = self.now.max(target);
                None
            }
        }
    }
}
