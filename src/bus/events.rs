use serde::Serialize;

use crate::intent::NavigationOrigin;
use crate::location::{Location, UrlKey};

/// How the guard carried out a push request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PushDecision {
    /// Target differs from the displayed location: a new entry was created.
    Allowed,
    /// Same URL, but not rapid: allowed as a deliberate same-URL push.
    AllowedSameUrl,
    /// Same URL within the rapid window: performed as a replace.
    Coalesced,
}

impl PushDecision {
    /// Whether the decision created a new history entry.
    pub fn creates_entry(self) -> bool {
        !matches!(self, PushDecision::Coalesced)
    }
}

/// Events published on the [`NavigationBus`](super::NavigationBus).
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationEvent {
    /// The session history moved between existing entries (back/forward).
    Traversal {
        from: Location,
        to: Location,
        delta: i32,
    },
    /// A push request went through the history guard.
    PushHandled { key: UrlKey, decision: PushDecision },
    /// A replace went through the history guard.
    Replaced { key: UrlKey },
    /// The router committed a new location.
    Committed {
        location: Location,
        origin: NavigationOrigin,
    },
    /// The back-navigation window opened (or was re-armed).
    BackWindowOpened,
    /// The back-navigation window decayed.
    BackWindowClosed,
    /// A programmatic navigation to the current URL was dropped.
    NavigationSkipped { key: UrlKey },
    /// The router caught up with a browser URL it had missed.
    RouterResynced { location: Location },
}

impl NavigationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            NavigationEvent::Traversal { .. } => "traversal",
            NavigationEvent::PushHandled { .. } => "push_handled",
            NavigationEvent::Replaced { .. } => "replaced",
            NavigationEvent::Committed { .. } => "committed",
            NavigationEvent::BackWindowOpened => "back_window_opened",
            NavigationEvent::BackWindowClosed => "back_window_closed",
            NavigationEvent::NavigationSkipped { .. } => "navigation_skipped",
            NavigationEvent::RouterResynced { .. } => "router_resynced",
        }
    }
}
