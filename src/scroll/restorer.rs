use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

use crate::bus::{NavigationBus, NavigationEvent, Priority, Subscription};
use crate::clock::{Scheduler, TimerId};
use crate::config::ScrollConfig;
use crate::detector::BackNavigationProbe;
use crate::location::Location;

use super::viewport::{ScrollBehavior, Viewport};

/// Where the viewport should end up after a page change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollTarget {
    Top,
    Anchor(String),
}

/// A pending restoration, derived from one committed pathname change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRestorationRequest {
    pub target: ScrollTarget,
    pub delay: Duration,
    pub after_back_navigation: bool,
}

impl ScrollRestorationRequest {
    pub fn for_location(
        location: &Location,
        after_back_navigation: bool,
        config: &ScrollConfig,
    ) -> Self {
        let target = match location.anchor() {
            Some(id) => ScrollTarget::Anchor(id.to_string()),
            None => ScrollTarget::Top,
        };
        let has_anchor = matches!(target, ScrollTarget::Anchor(_));
        let delay = config.delay_for(after_back_navigation, has_anchor);
        Self {
            target,
            delay,
            after_back_navigation,
        }
    }
}

/// Result of the single restoration attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollOutcome {
    ScrolledToTop,
    ScrolledToAnchor(String),
    /// The anchor element did not exist yet; nothing was scrolled.
    AnchorMissing(String),
}

struct RestorerCore {
    viewport: Arc<dyn Viewport>,
    scheduler: Arc<dyn Scheduler>,
    probe: BackNavigationProbe,
    config: ScrollConfig,
    state: Mutex<RestorerState>,
}

struct RestorerState {
    previous_pathname: String,
    pending: Option<TimerId>,
    last_request: Option<ScrollRestorationRequest>,
    last_outcome: Option<ScrollOutcome>,
}

impl RestorerCore {
    fn on_commit(self: &Arc<Self>, location: &Location) {
        let mut state = self.state.lock();
        if state.previous_pathname == location.pathname {
            return;
        }
        state.previous_pathname = location.pathname.clone();

        let request = ScrollRestorationRequest::for_location(
            location,
            self.probe.is_back_navigation_active(),
            &self.config,
        );

        if let Some(timer) = state.pending.take() {
            self.scheduler.clear_timeout(timer);
        }

        let core: Weak<RestorerCore> = Arc::downgrade(self);
        let target = request.target.clone();
        let timer = self.scheduler.set_timeout(
            request.delay,
            Box::new(move || {
                if let Some(core) = core.upgrade() {
                    core.perform(&target);
                }
            }),
        );

        tracing::debug!(
            pathname = %location.pathname,
            scroll_target = ?request.target,
            delay_ms = request.delay.as_millis() as u64,
            after_back_navigation = request.after_back_navigation,
            "Scroll restoration scheduled"
        );
        state.pending = Some(timer);
        state.last_request = Some(request);
    }

    fn perform(&self, target: &ScrollTarget) {
        let outcome = match target {
            ScrollTarget::Top => {
                self.viewport.scroll_to_origin(ScrollBehavior::Instant);
                ScrollOutcome::ScrolledToTop
            }
            ScrollTarget::Anchor(id) => {
                if self.viewport.scroll_into_view(id, ScrollBehavior::Smooth) {
                    ScrollOutcome::ScrolledToAnchor(id.clone())
                } else {
                    ScrollOutcome::AnchorMissing(id.clone())
                }
            }
        };

        let mut state = self.state.lock();
        state.pending = None;
        state.last_outcome = Some(outcome);
    }

    fn cancel_pending(&self) {
        if let Some(timer) = self.state.lock().pending.take() {
            self.scheduler.clear_timeout(timer);
        }
    }
}

/// Mountable, render-less scroll restoration.
///
/// After every committed pathname change it makes exactly one delayed
/// attempt: scroll the hash target into view, or jump to the top. The delay
/// is longer right after a back-navigation, when the page is still being
/// rebuilt. Re-renders on the same pathname and hash-only changes never
/// scroll. Dropping the restorer unmounts it.
pub struct ScrollRestorer {
    core: Arc<RestorerCore>,
    _subscription: Subscription,
}

impl ScrollRestorer {
    pub fn mount(
        bus: &NavigationBus,
        scheduler: Arc<dyn Scheduler>,
        probe: BackNavigationProbe,
        viewport: Arc<dyn Viewport>,
        current: &Location,
        config: ScrollConfig,
    ) -> Self {
        let core = Arc::new(RestorerCore {
            viewport,
            scheduler,
            probe,
            config,
            state: Mutex::new(RestorerState {
                previous_pathname: current.pathname.clone(),
                pending: None,
                last_request: None,
                last_outcome: None,
            }),
        });

        let weak = Arc::downgrade(&core);
        let subscription = bus.subscribe(Priority::Effects, move |event| {
            let location = match event {
                NavigationEvent::Committed { location, .. } => location,
                _ => return,
            };
            if let Some(core) = weak.upgrade() {
                core.on_commit(location);
            }
        });

        Self {
            core,
            _subscription: subscription,
        }
    }

    pub fn last_request(&self) -> Option<ScrollRestorationRequest> {
        self.core.state.lock().last_request.clone()
    }

    pub fn last_outcome(&self) -> Option<ScrollOutcome> {
        self.core.state.lock().last_outcome.clone()
    }

    pub fn has_pending(&self) -> bool {
        self.core.state.lock().pending.is_some()
    }
}

impl Drop for ScrollRestorer {
    fn drop(&mut self) {
        self.core.cancel_pending();
    }
}
