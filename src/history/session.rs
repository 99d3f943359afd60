use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use super::HistoryController;
use crate::bus::{NavigationBus, NavigationEvent};
use crate::location::Location;

/// One entry in the session history stack.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub location: Location,
    pub state: Value,
    pub title: String,
}

/// In-memory browser session history.
///
/// Behaves like the native stack: pushing drops the forward entries,
/// replacing overwrites in place, and traversal fires a
/// [`NavigationEvent::Traversal`] on the bus (the `popstate` signal).
#[derive(Clone)]
pub struct SessionHistory {
    inner: Arc<Mutex<SessionInner>>,
    bus: NavigationBus,
}

struct SessionInner {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl SessionHistory {
    pub fn new(initial_url: &str, bus: NavigationBus) -> Self {
        let entry = HistoryEntry {
            location: Location::parse(initial_url),
            state: Value::Null,
            title: String::new(),
        };
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                entries: vec![entry],
                index: 0,
            })),
            bus,
        }
    }

    /// Snapshot of every entry, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.inner.lock().entries.clone()
    }

    /// Position of the current entry in [`entries`](Self::entries).
    pub fn index(&self) -> usize {
        self.inner.lock().index
    }

    pub fn current(&self) -> HistoryEntry {
        let inner = self.inner.lock();
        inner.entries[inner.index].clone()
    }
}

impl HistoryController for SessionHistory {
    fn push(&self, state: Value, title: &str, url: Option<&str>) {
        let mut inner = self.inner.lock();
        let index = inner.index;
        let location = inner.entries[index].location.resolve(url.unwrap_or(""));
        inner.entries.truncate(index + 1);
        inner.entries.push(HistoryEntry {
            location,
            state,
            title: title.to_string(),
        });
        inner.index = index + 1;
    }

    fn replace(&self, state: Value, title: &str, url: Option<&str>) {
        let mut inner = self.inner.lock();
        let index = inner.index;
        let location = inner.entries[index].location.resolve(url.unwrap_or(""));
        inner.entries[index] = HistoryEntry {
            location,
            state,
            title: title.to_string(),
        };
    }

    fn go(&self, delta: i32) {
        let (from, to) = {
            let mut inner = self.inner.lock();
            let target = inner.index as i64 + delta as i64;
            if delta == 0 || target < 0 || target >= inner.entries.len() as i64 {
                tracing::debug!(delta, index = inner.index, "Traversal out of range, ignored");
                return;
            }
            let from = inner.entries[inner.index].location.clone();
            inner.index = target as usize;
            (from, inner.entries[inner.index].location.clone())
        };

        self.bus
            .publish(NavigationEvent::Traversal { from, to, delta });
    }

    fn location(&self) -> Location {
        let inner = self.inner.lock();
        inner.entries[inner.index].location.clone()
    }

    fn length(&self) -> usize {
        self.inner.lock().entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Priority;

    fn keys(history: &SessionHistory) -> Vec<String> {
        history
            .entries()
            .iter()
            .map(|e| e.location.key().to_string())
            .collect()
    }

    #[test]
    fn push_appends_and_moves_index() {
        let history = SessionHistory::new("/", NavigationBus::new());
        history.push(Value::Null, "", Some("/browse"));
        history.push(Value::Null, "", Some("/media/42"));
        assert_eq!(keys(&history), vec!["/", "/browse", "/media/42"]);
        assert_eq!(history.index(), 2);
        assert_eq!(history.length(), 3);
    }

    #[test]
    fn push_after_back_drops_forward_entries() {
        let history = SessionHistory::new("/", NavigationBus::new());
        history.push(Value::Null, "", Some("/a"));
        history.push(Value::Null, "", Some("/b"));
        history.back();
        history.push(Value::Null, "", Some("/c"));
        assert_eq!(keys(&history), vec!["/", "/a", "/c"]);
    }

    #[test]
    fn replace_overwrites_current_entry() {
        let history = SessionHistory::new("/", NavigationBus::new());
        history.push(Value::Null, "", Some("/a"));
        history.replace(Value::Null, "", Some("/login"));
        assert_eq!(keys(&history), vec!["/", "/login"]);
    }

    #[test]
    fn traversal_publishes_event() {
        let bus = NavigationBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let _sub = bus.subscribe(Priority::Router, move |e| s.lock().push(e.clone()));

        let history = SessionHistory::new("/", bus);
        history.push(Value::Null, "", Some("/a"));
        history.back();

        assert_eq!(
            *seen.lock(),
            vec![NavigationEvent::Traversal {
                from: Location::parse("/a"),
                to: Location::root(),
                delta: -1,
            }]
        );
    }

    #[test]
    fn out_of_range_traversal_is_silent() {
        let bus = NavigationBus::new();
        let seen = Arc::new(Mutex::new(0usize));
        let s = Arc::clone(&seen);
        let _sub = bus.subscribe(Priority::Router, move |_| *s.lock() += 1);

        let history = SessionHistory::new("/", bus);
        history.back();
        history.go(0);
        history.forward();
        assert_eq!(*seen.lock(), 0);
        assert_eq!(history.location(), Location::root());
    }
}
