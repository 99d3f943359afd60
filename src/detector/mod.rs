//! Back-navigation detector.
//!
//! Answers "is the current render the result of the user pressing
//! back/forward?" with a time-boxed flag. Every traversal opens (or
//! re-arms) a window of `decay_window`; when it decays the flag drops on
//! its own. Readers get a [`BackNavigationProbe`] and cannot hold the
//! window open.

mod window;

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;

use crate::bus::{NavigationBus, NavigationEvent, Priority, Subscription};
use crate::clock::Scheduler;
use crate::config::DetectorConfig;

pub use window::WindowSnapshot;

use window::BackNavigationWindow;

struct DetectorCore {
    window: Mutex<BackNavigationWindow>,
    scheduler: Arc<dyn Scheduler>,
    bus: NavigationBus,
    decay: Duration,
}

impl DetectorCore {
    fn mark_traversal(self: &Arc<Self>) {
        let now = self.scheduler.now();
        {
            let mut window = self.window.lock();
            if let Some(timer) = window.timer.take() {
                self.scheduler.clear_timeout(timer);
            }
            let generation = window.open(now);

            let core: Weak<DetectorCore> = Arc::downgrade(self);
            let timer = self.scheduler.set_timeout(
                self.decay,
                Box::new(move || {
                    if let Some(core) = core.upgrade() {
                        core.decay(generation);
                    }
                }),
            );
            window.timer = Some(timer);
        }

        tracing::debug!(decay_ms = self.decay.as_millis() as u64, "Back-navigation window opened");
        self.bus.publish(NavigationEvent::BackWindowOpened);
    }

    fn decay(&self, generation: u64) {
        let closed = self.window.lock().close_if_current(generation);
        if closed {
            tracing::debug!("Back-navigation window closed");
            self.bus.publish(NavigationEvent::BackWindowClosed);
        }
    }

    fn is_active(&self) -> bool {
        self.window
            .lock()
            .is_active(self.scheduler.now(), self.decay)
    }

    fn reset(&self) {
        let mut window = self.window.lock();
        if let Some(timer) = window.timer.take() {
            self.scheduler.clear_timeout(timer);
        }
        window.clear();
    }
}

/// Owner of the back-navigation window.
pub struct BackNavigationDetector {
    core: Arc<DetectorCore>,
    subscription: Option<Subscription>,
}

impl BackNavigationDetector {
    /// Create the detector and subscribe it to traversals ahead of every
    /// other bus subscriber.
    pub fn install(
        bus: NavigationBus,
        scheduler: Arc<dyn Scheduler>,
        config: &DetectorConfig,
    ) -> Self {
        let core = Arc::new(DetectorCore {
            window: Mutex::new(BackNavigationWindow::default()),
            scheduler,
            bus: bus.clone(),
            decay: config.decay_window(),
        });

        let weak = Arc::downgrade(&core);
        let subscription = bus.subscribe(Priority::Detector, move |event| {
            if let NavigationEvent::Traversal { .. } = event {
                if let Some(core) = weak.upgrade() {
                    core.mark_traversal();
                }
            }
        });

        Self {
            core,
            subscription: Some(subscription),
        }
    }

    /// Record one native traversal event.
    pub fn mark_traversal(&self) {
        self.core.mark_traversal();
    }

    pub fn is_active(&self) -> bool {
        self.core.is_active()
    }

    pub fn probe(&self) -> BackNavigationProbe {
        BackNavigationProbe {
            core: Arc::clone(&self.core),
        }
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        self.core.window.lock().snapshot()
    }

    /// Drop the flag immediately and cancel the pending decay.
    pub fn reset(&self) {
        self.core.reset();
    }

    /// Stop listening for traversals. The window state is cleared.
    pub fn uninstall(&mut self) {
        self.subscription = None;
        self.core.reset();
    }

    pub fn is_installed(&self) -> bool {
        self.subscription.is_some()
    }
}

impl Drop for BackNavigationDetector {
    fn drop(&mut self) {
        self.core.reset();
    }
}

/// Read-only handle to the back-navigation window.
#[derive(Clone)]
pub struct BackNavigationProbe {
    core: Arc<DetectorCore>,
}

impl BackNavigationProbe {
    pub fn is_back_navigation_active(&self) -> bool {
        self.core.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualScheduler;

    fn detector(decay_ms: u64) -> (BackNavigationDetector, ManualScheduler) {
        let scheduler = ManualScheduler::new();
        let detector = BackNavigationDetector::install(
            NavigationBus::new(),
            Arc::new(scheduler.clone()),
            &DetectorConfig {
                decay_window_ms: decay_ms,
            },
        );
        (detector, scheduler)
    }

    #[test]
    fn inactive_until_traversal() {
        let (detector, _) = detector(500);
        assert!(!detector.is_active());
    }

    #[test]
    fn decays_without_manual_reset() {
        let (detector, scheduler) = detector(500);
        detector.mark_traversal();
        assert!(detector.is_active());
        scheduler.advance(Duration::from_millis(499));
        assert!(detector.is_active());
        scheduler.advance(Duration::from_millis(1));
        assert!(!detector.is_active());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn elapsed_check_covers_missed_timer() {
        let (detector, scheduler) = detector(200);
        detector.mark_traversal();
        // Drop the timer so the flag is never cleared by it.
        {
            let mut window = detector.core.window.lock();
            let timer = window.timer.take().unwrap();
            scheduler.clear_timeout(timer);
        }
        scheduler.advance(Duration::from_millis(250));
        assert!(detector.snapshot().active);
        assert!(!detector.is_active());
    }

    #[test]
    fn reset_cancels_timer() {
        let (detector, scheduler) = detector(500);
        detector.mark_traversal();
        detector.reset();
        assert!(!detector.is_active());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn uninstall_stops_listening() {
        let bus = NavigationBus::new();
        let scheduler = ManualScheduler::new();
        let mut detector = BackNavigationDetector::install(
            bus.clone(),
            Arc::new(scheduler.clone()),
            &DetectorConfig::default(),
        );
        assert!(detector.is_installed());
        detector.uninstall();
        assert!(!detector.is_installed());
        assert_eq!(bus.subscriber_count(), 0);
    }
}
