use std::sync::Arc;

use serde::Serialize;

use crate::bus::{NavigationBus, NavigationEvent};
use crate::detector::BackNavigationProbe;
use crate::guard::HistoryGuard;
use crate::intent::NavigationMode;

use super::router::Router;

/// Where a programmatic navigation goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    /// Relative or absolute path.
    Path(String),
    /// History traversal, e.g. `-1` for "back".
    Delta(i32),
}

impl From<&str> for NavigationTarget {
    fn from(path: &str) -> Self {
        NavigationTarget::Path(path.to_string())
    }
}

impl From<String> for NavigationTarget {
    fn from(path: String) -> Self {
        NavigationTarget::Path(path)
    }
}

impl From<i32> for NavigationTarget {
    fn from(delta: i32) -> Self {
        NavigationTarget::Delta(delta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigateOptions {
    pub replace: bool,
}

impl NavigateOptions {
    pub fn replace() -> Self {
        Self { replace: true }
    }

    fn mode(self) -> NavigationMode {
        if self.replace {
            NavigationMode::Replace
        } else {
            NavigationMode::Push
        }
    }
}

/// What a call to [`SafeNavigator::navigate`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigateOutcome {
    Navigated { mode: NavigationMode },
    Traversed { delta: i32 },
    /// Already on the target (or a zero delta); history untouched.
    Skipped,
    /// A redirect was held back because a back-navigation is in progress.
    Suppressed,
}

/// The sanctioned entry point for programmatic navigation.
///
/// Drops navigations to the URL already displayed, marks every real one as
/// programmatic for the guard, and lets redirect logic stand down while the
/// user is moving back through history.
#[derive(Clone)]
pub struct SafeNavigator {
    router: Arc<dyn Router>,
    guard: HistoryGuard,
    probe: BackNavigationProbe,
    bus: NavigationBus,
}

impl SafeNavigator {
    pub fn new(
        router: Arc<dyn Router>,
        guard: HistoryGuard,
        probe: BackNavigationProbe,
        bus: NavigationBus,
    ) -> Self {
        Self {
            router,
            guard,
            probe,
            bus,
        }
    }

    pub fn navigate(
        &self,
        target: impl Into<NavigationTarget>,
        options: NavigateOptions,
    ) -> NavigateOutcome {
        match target.into() {
            NavigationTarget::Delta(0) => NavigateOutcome::Skipped,
            NavigationTarget::Delta(delta) => {
                self.guard.set_programmatic_navigation(true);
                self.router.go(delta);
                NavigateOutcome::Traversed { delta }
            }
            NavigationTarget::Path(path) => {
                let current = self.router.location();
                let target = current.resolve(&path);

                if target.key() == current.key() && !options.replace {
                    let key = target.key();
                    tracing::warn!(
                        target_url = %key,
                        requested = %path,
                        "Already on target URL, skipping navigation"
                    );
                    self.bus.publish(NavigationEvent::NavigationSkipped { key });
                    return NavigateOutcome::Skipped;
                }

                let mode = options.mode();
                self.guard.set_programmatic_navigation(true);
                self.router.navigate(target.key().as_str(), mode);
                NavigateOutcome::Navigated { mode }
            }
        }
    }

    /// Push to `target` unless a back-navigation is in progress.
    ///
    /// For "redirect if not allowed here" effects that run on every render:
    /// right after the user pressed back they would otherwise bounce the user
    /// forward again.
    pub fn redirect(&self, target: &str) -> NavigateOutcome {
        if self.probe.is_back_navigation_active() {
            tracing::debug!(target_url = %target, "Redirect suppressed during back navigation");
            return NavigateOutcome::Suppressed;
        }
        self.navigate(target, NavigateOptions::default())
    }

    pub fn is_back_navigation_active(&self) -> bool {
        self.probe.is_back_navigation_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Priority;
    use crate::clock::ManualScheduler;
    use crate::config::{DetectorConfig, GuardConfig, RouterConfig};
    use crate::detector::BackNavigationDetector;
    use crate::guard::setup_history_guard;
    use crate::history::{HistoryController, SessionHistory};
    use crate::navigate::MemoryRouter;
    use parking_lot::Mutex;

    struct Fixture {
        navigator: SafeNavigator,
        session: SessionHistory,
        guard: HistoryGuard,
        detector: BackNavigationDetector,
        bus: NavigationBus,
        _router: MemoryRouter,
    }

    fn fixture(path: &str) -> Fixture {
        let bus = NavigationBus::new();
        let scheduler: Arc<ManualScheduler> = Arc::new(ManualScheduler::new());
        let detector = BackNavigationDetector::install(
            bus.clone(),
            scheduler.clone(),
            &DetectorConfig::default(),
        );
        let session = SessionHistory::new(path, bus.clone());
        let guard = setup_history_guard(
            Arc::new(session.clone()),
            bus.clone(),
            scheduler.clone(),
            GuardConfig::default(),
        );
        let router = MemoryRouter::new(
            Arc::new(guard.clone()),
            bus.clone(),
            scheduler,
            &RouterConfig::default(),
        );
        let navigator = SafeNavigator::new(
            Arc::new(router.clone()),
            guard.clone(),
            detector.probe(),
            bus.clone(),
        );
        Fixture {
            navigator,
            session,
            guard,
            detector,
            bus,
            _router: router,
        }
    }

    #[test]
    fn same_url_is_skipped() {
        let f = fixture("/home");
        let outcome = f.navigator.navigate("/home", NavigateOptions::default());
        assert_eq!(outcome, NavigateOutcome::Skipped);
        assert_eq!(f.session.length(), 1);
        assert!(!f.guard.is_programmatic());
    }

    #[test]
    fn skip_publishes_event() {
        let f = fixture("/home");
        let skipped = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&skipped);
        let _sub = f.bus.subscribe(Priority::Monitor, move |event| {
            if let NavigationEvent::NavigationSkipped { key } = event {
                sink.lock().push(key.to_string());
            }
        });
        f.navigator.navigate("/home", NavigateOptions::default());
        assert_eq!(*skipped.lock(), vec!["/home".to_string()]);
    }

    #[test]
    fn same_url_with_replace_goes_through() {
        let f = fixture("/home");
        let outcome = f.navigator.navigate("/home", NavigateOptions::replace());
        assert_eq!(
            outcome,
            NavigateOutcome::Navigated {
                mode: NavigationMode::Replace
            }
        );
        assert_eq!(f.session.length(), 1);
    }

    #[test]
    fn different_url_marks_programmatic() {
        let f = fixture("/");
        let outcome = f.navigator.navigate("/browse", NavigateOptions::default());
        assert_eq!(
            outcome,
            NavigateOutcome::Navigated {
                mode: NavigationMode::Push
            }
        );
        assert!(f.guard.is_programmatic());
        assert_eq!(f.session.location().pathname, "/browse");
    }

    #[test]
    fn relative_target_compared_after_resolution() {
        let f = fixture("/media/42");
        let outcome = f.navigator.navigate("42", NavigateOptions::default());
        assert_eq!(outcome, NavigateOutcome::Skipped);
    }

    #[test]
    fn zero_delta_is_skipped() {
        let f = fixture("/");
        assert_eq!(
            f.navigator.navigate(0, NavigateOptions::default()),
            NavigateOutcome::Skipped
        );
    }

    #[test]
    fn negative_delta_traverses() {
        let f = fixture("/");
        f.navigator.navigate("/browse", NavigateOptions::default());
        let outcome = f.navigator.navigate(-1, NavigateOptions::default());
        assert_eq!(outcome, NavigateOutcome::Traversed { delta: -1 });
        assert_eq!(f.session.location().pathname, "/");
        assert!(f.navigator.is_back_navigation_active());
    }

    #[test]
    fn redirect_suppressed_while_back_window_open() {
        let f = fixture("/");
        f.detector.mark_traversal();
        assert_eq!(f.navigator.redirect("/login"), NavigateOutcome::Suppressed);
        assert_eq!(f.session.length(), 1);
    }
}
