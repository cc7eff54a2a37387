//! Scheduled task bookkeeping.

use std::collections::BTreeMap;
use std::fmt;

use teloxide::types::ChatId;
use tokio::time::Instant;

/// Opaque handle identifying a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a scheduled task.
///
/// A task leaves `Pending` exactly once, to either `Fired` or `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting for its deadline.
    Pending,

    /// Removed from the table by a sweep; delivery was attempted.
    Fired,

    /// Removed from the table by a cancel call before firing.
    Cancelled,
}

/// A single deferred delivery.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    /// Task handle returned to the caller.
    pub id: TaskId,

    /// Chat the payload is delivered to.
    pub chat_id: ChatId,

    /// Text to deliver.
    pub payload: String,

    /// Earliest moment the task may fire.
    pub fire_at: Instant,

    /// Current lifecycle state.
    pub state: TaskState,
}

/// Table of pending deferred deliveries.
///
/// Keyed by task id, so tasks sharing a deadline drain in creation order.
#[derive(Debug)]
pub struct TaskTable {
    next_id: u64,
    pending: BTreeMap<TaskId, ScheduledTask>,
}

impl TaskTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            pending: BTreeMap::new(),
        }
    }

    /// Inserts a new pending task firing at `fire_at`, returning its id.
    pub fn insert(&mut self, fire_at: Instant, chat_id: ChatId, payload: String) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;

        self.pending.insert(
            id,
            ScheduledTask {
                id,
                chat_id,
                payload,
                fire_at,
                state: TaskState::Pending,
            },
        );

        id
    }

    /// Cancels a pending task.
    ///
    /// Returns `true` iff the task existed and had not yet fired.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Removes and returns every task due at `now`, marked as fired.
    ///
    /// Removal and the state transition happen together, so a task handed
    /// out here can no longer be cancelled or observed as pending.
    pub fn take_due(&mut self, now: Instant) -> Vec<ScheduledTask> {
        let due_ids: Vec<TaskId> = self
            .pending
            .iter()
            .filter(|(_, task)| task.fire_at <= now)
            .map(|(id, _)| *id)
            .collect();

        due_ids
            .into_iter()
            .filter_map(|id| self.pending.remove(&id))
            .map(|mut task| {
                task.state = TaskState::Fired;
                task
            })
            .collect()
    }

    /// Number of tasks still pending.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no tasks are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Snapshot of pending tasks in creation order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ScheduledTask> {
        self.pending.values().cloned().collect()
    }
}

impl Default for TaskTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_insert_assigns_distinct_ids() {
        let mut table = TaskTable::new();
        let now = Instant::now();

        let a = table.insert(now, ChatId(1), "a".to_owned());
        let b = table.insert(now, ChatId(1), "b".to_owned());

        assert_ne!(a, b);
        assert_eq!(table.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_due_removes_only_due_tasks() {
        let mut table = TaskTable::new();
        let now = Instant::now();

        let due = table.insert(now, ChatId(1), "now".to_owned());
        let later = table.insert(now + Duration::from_secs(5), ChatId(1), "later".to_owned());

        let fired = table.take_due(now);

        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id, due);
        assert_eq!(fired[0].state, TaskState::Fired);
        assert_eq!(table.len(), 1);
        assert_eq!(table.snapshot()[0].id, later);
    }

    #[tokio::test(start_paused = true)]
    async fn test_equal_deadlines_drain_in_creation_order() {
        let mut table = TaskTable::new();
        let at = Instant::now() + Duration::from_secs(1);

        let first = table.insert(at, ChatId(1), "first".to_owned());
        let second = table.insert(at, ChatId(2), "second".to_owned());
        let third = table.insert(at, ChatId(3), "third".to_owned());

        let fired = table.take_due(at);
        let ids: Vec<TaskId> = fired.iter().map(|task| task.id).collect();

        assert_eq!(ids, vec![first, second, third]);
        assert!(table.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_pending_task() {
        let mut table = TaskTable::new();
        let now = Instant::now();

        let id = table.insert(now, ChatId(1), "x".to_owned());

        assert!(table.cancel(id));
        assert!(table.is_empty());
        assert!(table.take_due(now).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_false_for_unknown_or_fired() {
        let mut table = TaskTable::new();
        let now = Instant::now();

        let id = table.insert(now, ChatId(1), "x".to_owned());
        assert_eq!(table.take_due(now).len(), 1);

        assert!(!table.cancel(id));
        assert!(!table.cancel(TaskId(9999)));
    }
}
