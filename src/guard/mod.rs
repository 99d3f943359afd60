//! History mutation guard.
//!
//! Wraps a [`HistoryController`] and downgrades rapid, identical pushes
//! (typically from third-party ad scripts or effect loops) to replaces, so
//! they cannot inflate the session history with duplicate entries. The
//! guard errs toward allowing: anything that is not clearly spam goes
//! through unchanged, and replace/traversal calls are never touched.

mod decision;
mod state;

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::bus::{NavigationBus, NavigationEvent, Priority, PushDecision, Subscription};
use crate::clock::Scheduler;
use crate::config::GuardConfig;
use crate::history::HistoryController;
use crate::location::Location;

pub use decision::{classify_push, PushCheck};
pub use state::GuardSnapshot;

use state::HistoryGuardState;

/// Install the history guard over `history`. Call once at bootstrap; every
/// other component should push through the returned guard.
pub fn setup_history_guard(
    history: Arc<dyn HistoryController>,
    bus: NavigationBus,
    scheduler: Arc<dyn Scheduler>,
    config: GuardConfig,
) -> HistoryGuard {
    let guard = HistoryGuard::new(history, bus, scheduler, config);
    tracing::info!(
        enabled = guard.config.enabled,
        rapid_window_ms = guard.config.rapid_window_ms,
        "History guard active"
    );
    guard
}

/// Decorator over a session history that filters duplicate-spam pushes.
#[derive(Clone)]
pub struct HistoryGuard {
    inner: Arc<dyn HistoryController>,
    state: Arc<Mutex<HistoryGuardState>>,
    scheduler: Arc<dyn Scheduler>,
    bus: NavigationBus,
    config: GuardConfig,
    _subscription: Arc<Subscription>,
}

impl HistoryGuard {
    pub fn new(
        inner: Arc<dyn HistoryController>,
        bus: NavigationBus,
        scheduler: Arc<dyn Scheduler>,
        config: GuardConfig,
    ) -> Self {
        let mut initial = HistoryGuardState::default();
        initial.observe(inner.location().key());
        let state = Arc::new(Mutex::new(initial));

        let observer = Arc::clone(&state);
        let subscription = bus.subscribe(Priority::Guard, move |event| match event {
            NavigationEvent::Traversal { to, .. } => {
                observer.lock().observe_traversal(to.key());
            }
            NavigationEvent::Committed { location, .. }
            | NavigationEvent::RouterResynced { location } => {
                observer.lock().observe(location.key());
            }
            _ => {}
        });

        Self {
            inner,
            state,
            scheduler,
            bus,
            config,
            _subscription: Arc::new(subscription),
        }
    }

    /// Handle a push request and report how it was carried out.
    pub fn request_push(&self, state: Value, title: &str, url: Option<&str>) -> PushDecision {
        let displayed = self.inner.location();
        let requested = displayed.resolve(url.unwrap_or("")).key();
        let displayed = displayed.key();
        let now = self.scheduler.now();

        let (decision, programmatic) = {
            let mut guard_state = self.state.lock();
            let decision = classify_push(PushCheck {
                displayed: &displayed,
                requested: &requested,
                last_pushed: guard_state.last_pushed(),
                now,
                rapid_window: self.config.rapid_window(),
                enabled: self.config.enabled,
            });
            guard_state.record_push(requested.clone(), now);
            if decision == PushDecision::Coalesced {
                guard_state.coalesced_count += 1;
            }
            (decision, guard_state.programmatic)
        };

        match decision {
            PushDecision::Coalesced => {
                tracing::warn!(
                    target_url = %requested,
                    "Rapid duplicate push coalesced into replace"
                );
                self.inner.replace(state, title, url);
            }
            PushDecision::Allowed | PushDecision::AllowedSameUrl => {
                tracing::debug!(target_url = %requested, ?decision, programmatic, "Push allowed");
                self.inner.push(state, title, url);
            }
        }

        self.state.lock().observe(self.inner.location().key());
        self.bus.publish(NavigationEvent::PushHandled {
            key: requested,
            decision,
        });
        decision
    }

    /// Mark the next navigation as coming from the app itself.
    ///
    /// `true` resets on its own after the configured interval; setting it
    /// again before then re-arms the reset instead of stacking a second one.
    pub fn set_programmatic_navigation(&self, value: bool) {
        let mut guard_state = self.state.lock();
        if let Some(timer) = guard_state.programmatic_timer.take() {
            self.scheduler.clear_timeout(timer);
        }
        guard_state.programmatic = value;
        guard_state.programmatic_generation += 1;

        if value {
            let generation = guard_state.programmatic_generation;
            let state = Arc::downgrade(&self.state);
            let timer = self.scheduler.set_timeout(
                self.config.programmatic_reset(),
                Box::new(move || {
                    let Some(state) = state.upgrade() else {
                        return;
                    };
                    let mut guard_state = state.lock();
                    if guard_state.programmatic_generation == generation {
                        guard_state.programmatic = false;
                        guard_state.programmatic_timer = None;
                    }
                }),
            );
            guard_state.programmatic_timer = Some(timer);
        }
    }

    pub fn is_programmatic(&self) -> bool {
        self.state.lock().programmatic
    }

    pub fn snapshot(&self) -> GuardSnapshot {
        self.state.lock().snapshot(self.config.enabled)
    }

    /// Forget all tracked pushes and the programmatic mark.
    pub fn reset(&self) {
        let mut guard_state = self.state.lock();
        if let Some(timer) = guard_state.programmatic_timer.take() {
            self.scheduler.clear_timeout(timer);
        }
        let generation = guard_state.programmatic_generation + 1;
        *guard_state = HistoryGuardState::default();
        guard_state.programmatic_generation = generation;
        guard_state.observe(self.inner.location().key());
    }
}

impl HistoryController for HistoryGuard {
    fn push(&self, state: Value, title: &str, url: Option<&str>) {
        self.request_push(state, title, url);
    }

    fn replace(&self, state: Value, title: &str, url: Option<&str>) {
        self.inner.replace(state, title, url);
        let key = self.inner.location().key();
        self.state.lock().observe(key.clone());
        self.bus.publish(NavigationEvent::Replaced { key });
    }

    fn go(&self, delta: i32) {
        self.inner.go(delta);
    }

    fn location(&self) -> Location {
        self.inner.location()
    }

    fn length(&self) -> usize {
        self.inner.length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualScheduler;
    use crate::history::SessionHistory;
    use std::time::Duration;

    fn guard_at(path: &str) -> (HistoryGuard, SessionHistory, ManualScheduler) {
        let bus = NavigationBus::new();
        let scheduler = ManualScheduler::new();
        let session = SessionHistory::new(path, bus.clone());
        let guard = HistoryGuard::new(
            Arc::new(session.clone()),
            bus,
            Arc::new(scheduler.clone()),
            GuardConfig::default(),
        );
        (guard, session, scheduler)
    }

    #[test]
    fn initial_observed_key_is_current_location() {
        let (guard, _, _) = guard_at("/home?x=1");
        assert_eq!(
            guard.snapshot().last_observed_key.unwrap().as_str(),
            "/home?x=1"
        );
    }

    #[test]
    fn baseline_updated_even_when_allowed() {
        let (guard, _, scheduler) = guard_at("/");
        scheduler.advance(Duration::from_millis(7));
        guard.push(Value::Null, "", Some("/browse"));
        let snapshot = guard.snapshot();
        assert_eq!(snapshot.last_pushed_key.unwrap().as_str(), "/browse");
        assert_eq!(snapshot.last_push_at, Some(Duration::from_millis(7)));
        assert_eq!(snapshot.last_observed_key.unwrap().as_str(), "/browse");
    }

    #[test]
    fn replace_passes_through() {
        let (guard, session, _) = guard_at("/home");
        for _ in 0..5 {
            guard.replace(Value::Null, "", Some("/home"));
        }
        assert_eq!(session.length(), 1);
    }

    #[test]
    fn programmatic_flag_resets_after_interval() {
        let (guard, _, scheduler) = guard_at("/");
        guard.set_programmatic_navigation(true);
        assert!(guard.is_programmatic());
        scheduler.advance(Duration::from_millis(99));
        assert!(guard.is_programmatic());
        scheduler.advance(Duration::from_millis(1));
        assert!(!guard.is_programmatic());
    }

    #[test]
    fn programmatic_flag_rearms_instead_of_stacking() {
        let (guard, _, scheduler) = guard_at("/");
        guard.set_programmatic_navigation(true);
        scheduler.advance(Duration::from_millis(80));
        guard.set_programmatic_navigation(true);
        scheduler.advance(Duration::from_millis(80));
        assert!(guard.is_programmatic());
        assert_eq!(scheduler.pending(), 1);
        scheduler.advance(Duration::from_millis(20));
        assert!(!guard.is_programmatic());
    }

    #[test]
    fn clearing_programmatic_cancels_reset() {
        let (guard, _, scheduler) = guard_at("/");
        guard.set_programmatic_navigation(true);
        guard.set_programmatic_navigation(false);
        assert!(!guard.is_programmatic());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn reset_clears_tracking() {
        let (guard, _, _) = guard_at("/home");
        guard.push(Value::Null, "", Some("/home"));
        guard.push(Value::Null, "", Some("/home"));
        assert_eq!(guard.snapshot().coalesced_count, 1);
        guard.reset();
        let snapshot = guard.snapshot();
        assert_eq!(snapshot.coalesced_count, 0);
        assert!(snapshot.last_pushed_key.is_none());
        assert_eq!(snapshot.last_observed_key.unwrap().as_str(), "/home");
    }
}
