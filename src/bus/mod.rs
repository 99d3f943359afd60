//! Navigation events channel.
//!
//! Replaces implicit "listener registration order" coordination with an
//! explicit publish/subscribe bus:
//!
//! ```text
//! SessionHistory ──Traversal──→ Detector → Guard → Router → Effects → Monitor
//!                                                    │
//!                                                    └──Committed──→ (queued)
//! ```
//!
//! - Subscribers are called in [`Priority`] order, then registration order.
//! - An event published while another is being delivered is queued and
//!   delivered once the current event has reached every subscriber.

mod events;

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

pub use events::{NavigationEvent, PushDecision};

/// Delivery order on the bus. Lower runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Detector,
    Guard,
    Router,
    Effects,
    Monitor,
}

type Handler = Arc<dyn Fn(&NavigationEvent) + Send + Sync>;

struct Subscriber {
    id: u64,
    priority: Priority,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: Vec<Subscriber>,
    queue: VecDeque<NavigationEvent>,
    dispatching: bool,
}

/// Single-tab navigation event bus.
#[derive(Clone, Default)]
pub struct NavigationBus {
    inner: Arc<Mutex<BusInner>>,
}

impl NavigationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. It stays registered until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, priority: Priority, handler: F) -> Subscription
    where
        F: Fn(&NavigationEvent) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;

        let position = inner
            .subscribers
            .iter()
            .position(|s| s.priority > priority)
            .unwrap_or(inner.subscribers.len());
        inner.subscribers.insert(
            position,
            Subscriber {
                id,
                priority,
                handler: Arc::new(handler),
            },
        );

        Subscription {
            bus: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Deliver `event` to every subscriber.
    ///
    /// Re-entrant calls (a handler publishing) enqueue and return immediately.
    /// A panicking handler releases the dispatch slot on its way out, so the
    /// bus keeps delivering afterwards.
    pub fn publish(&self, event: NavigationEvent) {
        {
            let mut inner = self.inner.lock();
            inner.queue.push_back(event);
            if inner.dispatching {
                return;
            }
            inner.dispatching = true;
        }
        let _release = scopeguard::guard_on_unwind((), |()| {
            self.inner.lock().dispatching = false;
        });

        loop {
            let (event, handlers) = {
                let mut inner = self.inner.lock();
                match inner.queue.pop_front() {
                    Some(event) => {
                        let handlers: Vec<Handler> = inner
                            .subscribers
                            .iter()
                            .map(|s| Arc::clone(&s.handler))
                            .collect();
                        (event, handlers)
                    }
                    None => {
                        inner.dispatching = false;
                        return;
                    }
                }
            };

            for handler in handlers {
                handler(&event);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

/// Keeps a bus handler registered; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    bus: Weak<Mutex<BusInner>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.lock().subscribers.retain(|s| s.id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    type BoxedHandler = Box<dyn Fn(&NavigationEvent) + Send + Sync>;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> BoxedHandler) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        let make = move |tag: &str| {
            let l = Arc::clone(&l);
            let tag = tag.to_string();
            Box::new(move |e: &NavigationEvent| {
                l.lock().push(format!("{}:{}", tag, e.name()));
            }) as BoxedHandler
        };
        (log, make)
    }

    #[test]
    fn priority_orders_delivery() {
        let bus = NavigationBus::new();
        let (log, make) = recorder();
        let _effects = bus.subscribe(Priority::Effects, make("effects"));
        let _detector = bus.subscribe(Priority::Detector, make("detector"));
        let _router = bus.subscribe(Priority::Router, make("router"));

        bus.publish(NavigationEvent::BackWindowOpened);
        assert_eq!(
            *log.lock(),
            vec![
                "detector:back_window_opened",
                "router:back_window_opened",
                "effects:back_window_opened"
            ]
        );
    }

    #[test]
    fn nested_publish_is_queued() {
        let bus = NavigationBus::new();
        let (log, make) = recorder();
        let _first = bus.subscribe(Priority::Detector, make("first"));
        let inner_bus = bus.clone();
        let _router = bus.subscribe(Priority::Router, move |e| {
            if let NavigationEvent::Traversal { to, .. } = e {
                inner_bus.publish(NavigationEvent::Committed {
                    location: to.clone(),
                    origin: crate::intent::NavigationOrigin::BrowserBackForward,
                });
            }
        });
        let _last = bus.subscribe(Priority::Monitor, make("last"));

        bus.publish(NavigationEvent::Traversal {
            from: Location::parse("/a"),
            to: Location::root(),
            delta: -1,
        });

        assert_eq!(
            *log.lock(),
            vec![
                "first:traversal",
                "last:traversal",
                "first:committed",
                "last:committed"
            ]
        );
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let bus = NavigationBus::new();
        let (log, make) = recorder();
        let sub = bus.subscribe(Priority::Effects, make("x"));
        assert_eq!(bus.subscriber_count(), 1);
        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(NavigationEvent::BackWindowClosed);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn panicking_handler_does_not_wedge_bus() {
        let bus = NavigationBus::new();
        let (log, make) = recorder();
        let _faulty = bus.subscribe(Priority::Effects, |e| {
            if matches!(e, NavigationEvent::BackWindowOpened) {
                panic!("effect failed");
            }
        });
        let _monitor = bus.subscribe(Priority::Monitor, make("monitor"));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            bus.publish(NavigationEvent::BackWindowOpened);
        }));
        assert!(result.is_err());

        bus.publish(NavigationEvent::BackWindowClosed);
        assert_eq!(*log.lock(), vec!["monitor:back_window_closed"]);
    }
}
