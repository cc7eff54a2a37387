//! Deferred delivery scheduling module.
//!
//! Tracks messages scheduled for later delivery and fires each one
//! at most once through the outbound transport.

mod runner;
mod state;

pub use runner::{DeferredScheduler, SchedulerMessage};
pub use state::{ScheduledTask, TaskId, TaskState, TaskTable};
