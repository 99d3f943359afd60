//! Bootstrap and the per-tab navigation surface.

use std::sync::Arc;

use serde_json::Value;

use crate::back_button::{BackButtonAction, HardwareBackButton};
use crate::bus::{NavigationBus, PushDecision};
use crate::clock::Scheduler;
use crate::config::NavigationConfig;
use crate::detector::{BackNavigationDetector, BackNavigationProbe};
use crate::diagnostics::{DuplicateAnalysis, HistoryReport, NavigationMonitor};
use crate::guard::{setup_history_guard, HistoryGuard};
use crate::history::{HistoryController, SessionHistory};
use crate::location::Location;
use crate::navigate::{MemoryRouter, Router, SafeNavigator};
use crate::scroll::{ScrollOutcome, ScrollRestorer, Viewport};

/// One browser tab with the whole navigation layer installed.
///
/// Wiring order matters only for readability; delivery order on the bus is
/// fixed by subscriber priority (detector first, effects last).
pub struct NavigationTab {
    config: NavigationConfig,
    bus: NavigationBus,
    session: SessionHistory,
    guard: HistoryGuard,
    detector: BackNavigationDetector,
    router: MemoryRouter,
    navigator: SafeNavigator,
    scroll: ScrollRestorer,
    back_button: HardwareBackButton,
    _monitor: Option<NavigationMonitor>,
}

impl NavigationTab {
    pub fn bootstrap(
        config: NavigationConfig,
        scheduler: Arc<dyn Scheduler>,
        initial_url: &str,
        viewport: Arc<dyn Viewport>,
    ) -> Self {
        let bus = NavigationBus::new();
        let detector =
            BackNavigationDetector::install(bus.clone(), scheduler.clone(), &config.detector);

        let session = SessionHistory::new(initial_url, bus.clone());
        let guard = setup_history_guard(
            Arc::new(session.clone()),
            bus.clone(),
            scheduler.clone(),
            config.guard.clone(),
        );

        let router = MemoryRouter::new(
            Arc::new(guard.clone()),
            bus.clone(),
            scheduler.clone(),
            &config.router,
        );
        let navigator = SafeNavigator::new(
            Arc::new(router.clone()),
            guard.clone(),
            detector.probe(),
            bus.clone(),
        );
        let scroll = ScrollRestorer::mount(
            &bus,
            scheduler,
            detector.probe(),
            viewport,
            &router.location(),
            config.scroll.clone(),
        );
        let back_button = HardwareBackButton::new(Arc::new(router.clone()), &config.back_button);
        let monitor = config
            .diagnostics
            .monitor
            .then(|| NavigationMonitor::install(&bus));

        tracing::debug!(initial_url, "Navigation tab ready");

        Self {
            config,
            bus,
            session,
            guard,
            detector,
            router,
            navigator,
            scroll,
            back_button,
            _monitor: monitor,
        }
    }

    pub fn is_back_navigation_active(&self) -> bool {
        self.detector.is_active()
    }

    pub fn set_programmatic_navigation(&self, value: bool) {
        self.guard.set_programmatic_navigation(value);
    }

    /// The safe-navigate function for components.
    pub fn use_safe_navigate(&self) -> SafeNavigator {
        self.navigator.clone()
    }

    pub fn back_navigation_probe(&self) -> BackNavigationProbe {
        self.detector.probe()
    }

    /// Location the router has committed.
    pub fn location(&self) -> Location {
        self.router.location()
    }

    /// Location in the address bar.
    pub fn browser_location(&self) -> Location {
        self.session.location()
    }

    pub fn history_length(&self) -> usize {
        self.session.length()
    }

    /// The user pressed the browser back button.
    pub fn press_back(&self) {
        self.session.back();
    }

    /// The user pressed the browser forward button.
    pub fn press_forward(&self) {
        self.session.forward();
    }

    /// The user clicked an in-app link.
    pub fn click_link(&self, href: &str) -> Location {
        self.router.link_click(href)
    }

    /// A third-party script called `pushState` directly.
    pub fn third_party_push(&self, url: &str) -> PushDecision {
        self.guard.request_push(Value::Null, "", Some(url))
    }

    /// The platform back key was pressed.
    pub fn hardware_back(&self) -> BackButtonAction {
        self.back_button.press()
    }

    pub fn history_report(&self) -> HistoryReport {
        HistoryReport::capture(&self.session)
    }

    pub fn duplicate_analysis(&self) -> DuplicateAnalysis {
        DuplicateAnalysis::of(&self.session.entries())
    }

    pub fn scroll_outcome(&self) -> Option<ScrollOutcome> {
        self.scroll.last_outcome()
    }

    pub fn scroll_restorer(&self) -> &ScrollRestorer {
        &self.scroll
    }

    pub fn guard(&self) -> &HistoryGuard {
        &self.guard
    }

    pub fn detector(&self) -> &BackNavigationDetector {
        &self.detector
    }

    pub fn router(&self) -> &MemoryRouter {
        &self.router
    }

    pub fn session(&self) -> &SessionHistory {
        &self.session
    }

    pub fn bus(&self) -> &NavigationBus {
        &self.bus
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }
}
