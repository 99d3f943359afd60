//! Developer diagnostics for back-button problems.
//!
//! - [`HistoryReport`]: where the session history currently stands
//! - [`DuplicateAnalysis`]: whether the stack is full of identical URLs
//!   (the usual reason "back does nothing")
//! - [`NavigationMonitor`]: logs every navigation event

use std::collections::HashSet;

use serde::Serialize;

use crate::bus::{NavigationBus, NavigationEvent, Priority, Subscription};
use crate::history::{HistoryController, HistoryEntry, SessionHistory};
use crate::location::UrlKey;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryReport {
    pub current: UrlKey,
    pub length: usize,
    pub index: usize,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

impl HistoryReport {
    pub fn capture(history: &SessionHistory) -> Self {
        let length = history.length();
        let index = history.index();
        Self {
            current: history.location().key(),
            length,
            index,
            can_go_back: index > 0,
            can_go_forward: index + 1 < length,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateVerdict {
    Healthy,
    /// Fewer than half of the entries are distinct.
    ManyDuplicates,
    /// More than one entry, all with the same URL.
    AllSame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateAnalysis {
    pub total: usize,
    pub unique: usize,
    /// Indices whose URL equals the entry right before them.
    pub adjacent_duplicates: Vec<usize>,
    pub verdict: DuplicateVerdict,
}

impl DuplicateAnalysis {
    pub fn of(entries: &[HistoryEntry]) -> Self {
        let keys: Vec<UrlKey> = entries.iter().map(|e| e.location.key()).collect();
        let unique = keys.iter().collect::<HashSet<_>>().len();
        let adjacent_duplicates = keys
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0] == pair[1])
            .map(|(i, _)| i + 1)
            .collect();

        let total = keys.len();
        let verdict = if total > 1 && unique == 1 {
            DuplicateVerdict::AllSame
        } else if unique * 2 < total {
            DuplicateVerdict::ManyDuplicates
        } else {
            DuplicateVerdict::Healthy
        };

        Self {
            total,
            unique,
            adjacent_duplicates,
            verdict,
        }
    }
}

/// Logs every bus event at debug level while installed.
pub struct NavigationMonitor {
    _subscription: Subscription,
}

impl NavigationMonitor {
    pub fn install(bus: &NavigationBus) -> Self {
        let subscription = bus.subscribe(Priority::Monitor, |event| match event {
            NavigationEvent::Traversal { from, to, delta } => {
                tracing::debug!(%from, %to, delta, "Traversal");
            }
            NavigationEvent::PushHandled { key, decision } => {
                tracing::debug!(url = %key, ?decision, "Push handled");
            }
            NavigationEvent::Replaced { key } => {
                tracing::debug!(url = %key, "Replaced");
            }
            NavigationEvent::Committed { location, origin } => {
                tracing::debug!(%location, %origin, "Committed");
            }
            NavigationEvent::NavigationSkipped { key } => {
                tracing::debug!(url = %key, "Navigation skipped");
            }
            NavigationEvent::RouterResynced { location } => {
                tracing::debug!(%location, "Router resynced");
            }
            NavigationEvent::BackWindowOpened | NavigationEvent::BackWindowClosed => {
                tracing::debug!(event = event.name(), "Back-navigation window");
            }
        });
        Self {
            _subscription: subscription,
        }
    }
}
