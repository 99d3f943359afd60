use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{Scheduler, TimerId, TimerTask};

/// Deterministic virtual-time scheduler.
///
/// Time only moves when [`advance`](Self::advance) is called. Due timers fire
/// in deadline order, ties in the order they were scheduled. Tasks may
/// schedule or cancel other timers while running.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualInner>>,
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<(Duration, u64), TimerTask>,
    deadlines: HashMap<u64, Duration>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move virtual time forward by `by`, firing every timer that becomes due.
    pub fn advance(&self, by: Duration) {
        let target = self.inner.lock().now + by;
        self.advance_to(target);
    }

    /// Move virtual time forward to `target`. Earlier targets only flush due timers.
    pub fn advance_to(&self, target: Duration) {
        loop {
            let task = {
                let mut inner = self.inner.lock();
                let due = inner
                    .timers
                    .keys()
                    .next()
                    .copied()
                    .filter(|(deadline, _)| *deadline <= target);
                match due {
                    Some(key) => {
                        let (deadline, id) = key;
                        inner.deadlines.remove(&id);
                        if deadline > inner.now {
                            inner.now = deadline;
                        }
                        inner.timers.remove(&key)
                    }
                    None => None,
                }
            };

            match task {
                Some(task) => task(),
                None => break,
            }
        }

        let mut inner = self.inner.lock();
        if target > inner.now {
            inner.now = target;
        }
    }

    /// Fire timers that are already due without moving time.
    pub fn run_due(&self) {
        self.advance(Duration::ZERO);
    }

    /// Number of timers waiting to fire.
    pub fn pending(&self) -> usize {
        self.inner.lock().timers.len()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.inner.lock().now
    }

    fn set_timeout(&self, delay: Duration, task: TimerTask) -> TimerId {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        let deadline = inner.now + delay;
        inner.timers.insert((deadline, id), task);
        inner.deadlines.insert(id, deadline);
        TimerId::new(id)
    }

    fn clear_timeout(&self, id: TimerId) -> bool {
        let mut inner = self.inner.lock();
        match inner.deadlines.remove(&id.raw()) {
            Some(deadline) => inner.timers.remove(&(deadline, id.raw())).is_some(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    #[test]
    fn timer_fires_only_after_deadline() {
        let scheduler = ManualScheduler::new();
        let fired = counter();
        let f = Arc::clone(&fired);
        scheduler.set_timeout(
            Duration::from_millis(100),
            Box::new(move || {
                f.fetch_add(1, Ordering::SeqCst);
            }),
        );

        scheduler.advance(Duration::from_millis(99));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        scheduler.advance(Duration::from_millis(1));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn cleared_timer_never_fires() {
        let scheduler = ManualScheduler::new();
        let fired = counter();
        let f = Arc::clone(&fired);
        let id = scheduler.set_timeout(
            Duration::from_millis(10),
            Box::new(move || {
                f.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert!(scheduler.clear_timeout(id));
        assert!(!scheduler.clear_timeout(id));
        scheduler.advance(Duration::from_secs(1));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn zero_delay_runs_on_next_flush() {
        let scheduler = ManualScheduler::new();
        let fired = counter();
        let f = Arc::clone(&fired);
        scheduler.set_timeout(
            Duration::ZERO,
            Box::new(move || {
                f.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        scheduler.run_due();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn task_sees_its_own_deadline_as_now() {
        let scheduler = ManualScheduler::new();
        let seen = Arc::new(Mutex::new(None));
        let s = scheduler.clone();
        let slot = Arc::clone(&seen);
        scheduler.set_timeout(
            Duration::from_millis(40),
            Box::new(move || {
                *slot.lock() = Some(s.now());
            }),
        );
        scheduler.advance(Duration::from_millis(100));
        assert_eq!(*seen.lock(), Some(Duration::from_millis(40)));
        assert_eq!(scheduler.now(), Duration::from_millis(100));
    }

    #[test]
    fn nested_timers_scheduled_inside_window_fire() {
        let scheduler = ManualScheduler::new();
        let fired = counter();
        let s = scheduler.clone();
        let f = Arc::clone(&fired);
        scheduler.set_timeout(
            Duration::from_millis(10),
            Box::new(move || {
                let f2 = Arc::clone(&f);
                s.set_timeout(
                    Duration::from_millis(10),
                    Box::new(move || {
                        f2.fetch_add(1, Ordering::SeqCst);
                    }),
                );
            }),
        );
        scheduler.advance(Duration::from_millis(20));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
