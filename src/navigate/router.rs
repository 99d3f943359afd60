use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;

use crate::bus::{NavigationBus, NavigationEvent, Priority, Subscription};
use crate::clock::{Scheduler, TimerId};
use crate::config::RouterConfig;
use crate::history::HistoryController;
use crate::intent::{NavigationIntent, NavigationMode, NavigationOrigin};
use crate::location::Location;

/// The client-side router the façade wraps.
pub trait Router: Send + Sync {
    /// Location the router last committed.
    fn location(&self) -> Location;

    /// Push or replace `path` and commit it.
    fn navigate(&self, path: &str, mode: NavigationMode);

    /// Traverse the session history by `delta` entries.
    fn go(&self, delta: i32);
}

struct RouterCore {
    history: Arc<dyn HistoryController>,
    bus: NavigationBus,
    scheduler: Arc<dyn Scheduler>,
    location: Mutex<Location>,
    resync_timer: Mutex<Option<TimerId>>,
    resync_delay: Duration,
}

impl RouterCore {
    fn dispatch(&self, intent: NavigationIntent) -> Location {
        let target = self.location.lock().resolve(&intent.target);
        let url = target.key();

        match intent.mode {
            NavigationMode::Push => self.history.push(Value::Null, "", Some(url.as_str())),
            NavigationMode::Replace => self.history.replace(Value::Null, "", Some(url.as_str())),
        }

        *self.location.lock() = target.clone();
        tracing::debug!(
            location = %target,
            origin = %intent.origin,
            mode = ?intent.mode,
            "Route committed"
        );
        self.bus.publish(NavigationEvent::Committed {
            location: target.clone(),
            origin: intent.origin,
        });
        target
    }

    fn on_traversal(self: &Arc<Self>, to: &Location) {
        *self.location.lock() = to.clone();
        tracing::debug!(location = %to, "Route committed from traversal");
        self.bus.publish(NavigationEvent::Committed {
            location: to.clone(),
            origin: NavigationOrigin::BrowserBackForward,
        });
        self.schedule_resync();
    }

    fn schedule_resync(self: &Arc<Self>) {
        let mut slot = self.resync_timer.lock();
        if let Some(timer) = slot.take() {
            self.scheduler.clear_timeout(timer);
        }
        let core: Weak<RouterCore> = Arc::downgrade(self);
        let timer = self.scheduler.set_timeout(
            self.resync_delay,
            Box::new(move || {
                if let Some(core) = core.upgrade() {
                    *core.resync_timer.lock() = None;
                    core.sync_with_browser();
                }
            }),
        );
        *slot = Some(timer);
    }

    fn sync_with_browser(&self) -> bool {
        let browser = self.history.location();
        {
            let mut location = self.location.lock();
            if location.key() == browser.key() {
                return false;
            }
            *location = browser.clone();
        }

        tracing::info!(location = %browser, "Router out of sync with browser URL, resynced");
        self.bus.publish(NavigationEvent::RouterResynced {
            location: browser.clone(),
        });
        self.bus.publish(NavigationEvent::Committed {
            location: browser,
            origin: NavigationOrigin::BrowserBackForward,
        });
        true
    }
}

/// In-memory router over a [`HistoryController`].
///
/// Commits a location for every navigation it performs and for every
/// traversal it observes on the bus.
#[derive(Clone)]
pub struct MemoryRouter {
    core: Arc<RouterCore>,
    _subscription: Arc<Subscription>,
}

impl MemoryRouter {
    pub fn new(
        history: Arc<dyn HistoryController>,
        bus: NavigationBus,
        scheduler: Arc<dyn Scheduler>,
        config: &RouterConfig,
    ) -> Self {
        let core = Arc::new(RouterCore {
            location: Mutex::new(history.location()),
            history,
            bus: bus.clone(),
            scheduler,
            resync_timer: Mutex::new(None),
            resync_delay: config.resync_delay(),
        });

        let weak = Arc::downgrade(&core);
        let subscription = bus.subscribe(Priority::Router, move |event| {
            if let NavigationEvent::Traversal { to, .. } = event {
                if let Some(core) = weak.upgrade() {
                    core.on_traversal(to);
                }
            }
        });

        Self {
            core,
            _subscription: Arc::new(subscription),
        }
    }

    /// Carry out a navigation request and return the committed location.
    pub fn dispatch(&self, intent: NavigationIntent) -> Location {
        self.core.dispatch(intent)
    }

    /// A user clicked an in-app link.
    pub fn link_click(&self, href: &str) -> Location {
        self.dispatch(NavigationIntent::push(href, NavigationOrigin::UserClick))
    }

    /// Commit the browser URL if the router has fallen behind it.
    /// Returns whether anything changed.
    pub fn sync_with_browser(&self) -> bool {
        self.core.sync_with_browser()
    }
}

impl Router for MemoryRouter {
    fn location(&self) -> Location {
        self.core.location.lock().clone()
    }

    fn navigate(&self, path: &str, mode: NavigationMode) {
        self.dispatch(NavigationIntent::new(
            path,
            mode,
            NavigationOrigin::Programmatic,
        ));
    }

    fn go(&self, delta: i32) {
        self.core.history.go(delta);
    }
}
