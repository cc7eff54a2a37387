//! Deferred delivery scheduler.
//!
//! Each sweep of the run loop:
//! 1. Under the table lock, remove every task whose deadline has passed.
//! 2. With no lock held, send each payload through the transport.
//! 3. Log failed sends; a task gets exactly one delivery attempt.
//!
//! `schedule` and `cancel` serialize on the same lock as the sweep, so a
//! task the sweep took can no longer be cancelled and a cancelled task can
//! never be swept. Cancellation is cooperative: it only prevents a future
//! fire, it does not revoke a delivery already in flight.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use teloxide::types::{ChatId, Recipient};
use tokio::sync::mpsc;
use tokio::time::{Instant, interval};
use tracing::{debug, info, warn};

use super::state::{ScheduledTask, TaskId, TaskTable};
use crate::telegram::Transport;

/// Default sweep interval for due-task checks.
const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_millis(500);

/// Messages that can be sent to the scheduler loop.
#[derive(Debug, Clone)]
pub enum SchedulerMessage {
    /// Stop the scheduler.
    Shutdown,
}

/// Deferred delivery scheduler.
///
/// Cheap to clone; all clones share one task table, so commands can
/// schedule and cancel while the run loop sweeps.
#[derive(Clone)]
pub struct DeferredScheduler {
    inner: Arc<SchedulerInner>,
    check_interval: Duration,
}

struct SchedulerInner {
    /// Transport used to deliver fired payloads.
    transport: Arc<dyn Transport>,

    /// Pending tasks, shared between callers and the run loop.
    table: Mutex<TaskTable>,
}

impl DeferredScheduler {
    /// Creates a scheduler delivering through the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                transport,
                table: Mutex::new(TaskTable::new()),
            }),
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }

    /// Sets the sweep interval for due-task checks.
    ///
    /// The sweep period must be non-zero; a zero interval falls back to
    /// the default.
    #[must_use]
    pub const fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = if interval.is_zero() {
            DEFAULT_CHECK_INTERVAL
        } else {
            interval
        };
        self
    }

    /// Schedules `payload` for delivery to `chat_id` after `delay`.
    ///
    /// A zero delay is accepted; the task fires on the next sweep. A delay
    /// too large for the clock clamps to a far-future deadline.
    pub fn schedule(&self, delay: Duration, chat_id: ChatId, payload: impl Into<String>) -> TaskId {
        let fire_at = Instant::now()
            .checked_add(delay)
            .unwrap_or_else(|| Instant::now() + Duration::from_secs(86400 * 365 * 30));
        let id = self
            .inner
            .table
            .lock()
            .insert(fire_at, chat_id, payload.into());

        debug!(
            "Scheduled task {} for chat {} in {}s",
            id,
            chat_id,
            delay.as_secs()
        );
        id
    }

    /// Cancels a pending task.
    ///
    /// Returns `false` if the task already fired, was already cancelled, or
    /// never existed.
    pub fn cancel(&self, id: TaskId) -> bool {
        let cancelled = self.inner.table.lock().cancel(id);
        if cancelled {
            debug!("Cancelled task {}", id);
        }
        cancelled
    }

    /// Number of tasks still waiting to fire.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.table.lock().len()
    }

    /// Snapshot of pending tasks in creation order.
    #[must_use]
    pub fn pending(&self) -> Vec<ScheduledTask> {
        self.inner.table.lock().snapshot()
    }

    /// Runs the scheduler loop.
    pub async fn run(&self, mut rx: mpsc::Receiver<SchedulerMessage>) {
        info!("Deferred delivery scheduler started");

        let mut check_timer = interval(self.check_interval);

        loop {
            tokio::select! {
                _ = check_timer.tick() => {
                    self.tick().await;
                }
                msg = rx.recv() => {
                    match msg {
                        Some(SchedulerMessage::Shutdown) | None => {
                            info!("Scheduler shutting down");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Single sweep over the task table.
    async fn tick(&self) {
        // Decide and remove under the lock, deliver with no lock held.
        let due = {
            let mut table = self.inner.table.lock();
            table.take_due(Instant::now())
        };

        for task in due {
            match self
                .inner
                .transport
                .send_text(Recipient::Id(task.chat_id), &task.payload)
                .await
            {
                Ok(()) => {
                    info!("Task {} delivered to chat {}", task.id, task.chat_id);
                }
                Err(e) => {
                    // One attempt per task; the payload is dropped.
                    warn!("Task {} failed to deliver: {}", task.id, e);
                }
            }
        }
    }
}

impl std::fmt::Debug for DeferredScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredScheduler")
            .field("check_interval", &self.check_interval)
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}
