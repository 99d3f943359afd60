use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{Scheduler, TimerId, TimerTask};

/// Errors that can occur when creating a real-time scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("No tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Real-time scheduler backed by tokio timers.
///
/// Each timeout is a spawned task sleeping until its deadline; cancellation
/// aborts the task.
pub struct TokioScheduler {
    handle: Handle,
    origin: Instant,
    next_id: AtomicU64,
    tasks: Arc<Mutex<HashMap<TimerId, JoinHandle<()>>>>,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            origin: Instant::now(),
            next_id: AtomicU64::new(0),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Build a scheduler on the runtime the caller is running in.
    pub fn from_current() -> Result<Self, SchedulerError> {
        Ok(Self::new(Handle::try_current()?))
    }

    /// Number of timers that have not fired or been cancelled.
    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn set_timeout(&self, delay: Duration, task: TimerTask) -> TimerId {
        let id = TimerId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let registry = Arc::clone(&self.tasks);

        // Hold the registry lock across spawn so the task cannot deregister
        // itself before it is registered.
        let mut tasks = self.tasks.lock();
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            registry.lock().remove(&id);
            task();
        });
        tasks.insert(id, join);
        id
    }

    fn clear_timeout(&self, id: TimerId) -> bool {
        match self.tasks.lock().remove(&id) {
            Some(join) => {
                join.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, join) in self.tasks.lock().drain() {
            join.abort();
        }
    }
}
