//! Cancellable single-shot timers
//!
//! A [`ScheduledTask`] is a spawned sleep raced against a
//! [`CancellationToken`]. Dropping the task cancels it, and every firing
//! carries the task's [`TaskId`] so the owner can tell a current timer from
//! one that was replaced while its message was in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        Self(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

pub struct ScheduledTask {
    id: TaskId,
    token: CancellationToken,
}

impl ScheduledTask {
    /// Run `on_fire` after `delay` unless cancelled first
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F>(delay: Duration, on_fire: F) -> Self
    where
        F: FnOnce(TaskId) + Send + 'static,
    {
        let id = TaskId::next();
        let token = CancellationToken::new();
        let cancelled = token.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => on_fire(id),
            }
        });

        Self { id, token }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Idempotent
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl std::fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
