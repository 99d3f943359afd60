use std::time::Duration;

use crate::clock::TimerId;
use crate::location::UrlKey;

/// Mutable guard state. Only [`HistoryGuard`](super::HistoryGuard) writes it.
#[derive(Debug, Default)]
pub(super) struct HistoryGuardState {
    /// Key of the last location seen via traversal, commit or mutation.
    pub last_observed_key: Option<UrlKey>,
    pub last_pushed_key: Option<UrlKey>,
    pub last_push_at: Option<Duration>,
    pub programmatic: bool,
    pub programmatic_timer: Option<TimerId>,
    pub programmatic_generation: u64,
    pub coalesced_count: u64,
}

impl HistoryGuardState {
    pub fn observe(&mut self, key: UrlKey) {
        self.last_observed_key = Some(key);
    }

    /// A traversal landed on `key`. Clears the push baseline when the URL changed.
    pub fn observe_traversal(&mut self, key: UrlKey) {
        if self.last_observed_key.as_ref() != Some(&key) {
            self.last_pushed_key = None;
            self.last_push_at = None;
        }
        self.last_observed_key = Some(key);
    }

    pub fn record_push(&mut self, key: UrlKey, at: Duration) {
        self.last_pushed_key = Some(key);
        self.last_push_at = Some(at);
    }

    pub fn last_pushed(&self) -> Option<(&UrlKey, Duration)> {
        match (&self.last_pushed_key, self.last_push_at) {
            (Some(key), Some(at)) => Some((key, at)),
            _ => None,
        }
    }

    pub fn snapshot(&self, enabled: bool) -> GuardSnapshot {
        GuardSnapshot {
            last_observed_key: self.last_observed_key.clone(),
            last_pushed_key: self.last_pushed_key.clone(),
            last_push_at: self.last_push_at,
            programmatic: self.programmatic,
            coalesced_count: self.coalesced_count,
            enabled,
        }
    }
}

/// Read-only view of the guard state.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardSnapshot {
    pub last_observed_key: Option<UrlKey>,
    pub last_pushed_key: Option<UrlKey>,
    pub last_push_at: Option<Duration>,
    pub programmatic: bool,
    /// Pushes downgraded to replaces since install.
    pub coalesced_count: u64,
    pub enabled: bool,
}
