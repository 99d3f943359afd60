use std::time::Duration;

use crate::clock::TimerId;

/// The back-navigation window. Written only by the detector.
#[derive(Debug, Default)]
pub(super) struct BackNavigationWindow {
    pub active: bool,
    pub activated_at: Option<Duration>,
    pub timer: Option<TimerId>,
    generation: u64,
    opened_count: u64,
    closed_count: u64,
}

impl BackNavigationWindow {
    /// Open or re-arm the window. Returns the generation the decay timer must match.
    pub fn open(&mut self, now: Duration) -> u64 {
        self.active = true;
        self.activated_at = Some(now);
        self.generation += 1;
        self.opened_count += 1;
        self.generation
    }

    /// Close the window if `generation` is still the latest one.
    pub fn close_if_current(&mut self, generation: u64) -> bool {
        if generation != self.generation || !self.active {
            return false;
        }
        self.active = false;
        self.timer = None;
        self.closed_count += 1;
        true
    }

    /// Flag set and still inside the decay window.
    pub fn is_active(&self, now: Duration, decay: Duration) -> bool {
        match (self.active, self.activated_at) {
            (true, Some(at)) => now.saturating_sub(at) < decay,
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.active = false;
        self.timer = None;
        self.generation += 1;
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            active: self.active,
            activated_at: self.activated_at,
            opened_count: self.opened_count,
            closed_count: self.closed_count,
        }
    }
}

/// Read-only copy of the window, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSnapshot {
    /// Raw flag, without the elapsed-time check.
    pub active: bool,
    pub activated_at: Option<Duration>,
    /// Traversals seen (each opens or re-arms the window).
    pub opened_count: u64,
    /// Times the window decayed.
    pub closed_count: u64,
}
