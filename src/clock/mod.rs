//! Time source and timer abstraction.
//!
//! Components never read the wall clock or sleep directly. They receive an
//! `Arc<dyn Scheduler>` at construction, which lets tests drive decay
//! windows and delayed scrolls in virtual time.

mod manual;
mod tokio_impl;

use std::fmt;
use std::time::Duration;

pub use manual::ManualScheduler;
pub use tokio_impl::{SchedulerError, TokioScheduler};

/// Work scheduled to run once after a delay.
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Handle for a scheduled timer, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Monotonic clock plus one-shot timers.
///
/// Mirrors the `setTimeout` / `clearTimeout` pair of a browser main thread.
pub trait Scheduler: Send + Sync {
    /// Time elapsed since the scheduler was created.
    fn now(&self) -> Duration;

    /// Run `task` once after `delay`. A zero delay still defers the task.
    fn set_timeout(&self, delay: Duration, task: TimerTask) -> TimerId;

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    fn clear_timeout(&self, id: TimerId) -> bool;
}
