//! Cancellable delayed wake-ups.
//!
//! A [`ScheduledTask`] sleeps on the tokio timer and then posts its
//! [`TaskId`] on the owner's channel. Dropping the task aborts the sleep, so
//! replacing or clearing the owner's pending slot is enough to cancel it.
//! Owners still compare the fired id against the pending one, because an
//! abort can race with a wake-up that was already queued.

use crate::error::VoiceError;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Identifies one scheduled wake-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

/// Allocates ids and spawns delayed wake-ups onto one channel.
#[derive(Debug)]
pub struct Scheduler {
    runtime: Handle,
    tx: mpsc::UnboundedSender<TaskId>,
    next_id: u64,
}

impl Scheduler {
    /// Creates a scheduler bound to the current tokio runtime and the
    /// receiver its wake-ups arrive on.
    ///
    /// # Errors
    ///
    /// Returns [`VoiceError::NoRuntime`] when called outside a runtime.
    pub fn new() -> Result<(Self, mpsc::UnboundedReceiver<TaskId>), VoiceError> {
        let runtime = Handle::try_current().map_err(|_| VoiceError::NoRuntime)?;
        let (tx, rx) = mpsc::unbounded_channel();
        Ok((
            Self {
                runtime,
                tx,
                next_id: 1,
            },
            rx,
        ))
    }

    /// Schedules a wake-up after `delay` on the runtime captured at
    /// construction. Safe to call from any thread.
    pub fn schedule(&mut self, delay: Duration) -> ScheduledTask {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let tx = self.tx.clone();
        let deadline = Instant::now() + delay;
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // The owner may already be gone.
            let _ = tx.send(id);
        });
        ScheduledTask { id, handle }
    }
}

/// A pending wake-up. Aborted on drop.
#[derive(Debug)]
pub struct ScheduledTask {
    id: TaskId,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    pub fn id(&self) -> TaskId {
        self.id
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
