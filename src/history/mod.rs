//! Session history primitives.
//!
//! [`HistoryController`] is the interface the rest of the layer calls
//! through instead of patching the browser's history object in place.
//! [`SessionHistory`] is the in-memory model of the browser's own stack.

mod session;

use serde_json::Value;

use crate::location::Location;

pub use session::{HistoryEntry, SessionHistory};

/// Push/replace/traverse operations on a session history.
pub trait HistoryController: Send + Sync {
    /// Add a new entry for `url` (resolved against the current location).
    /// `None` means "the current URL".
    fn push(&self, state: Value, title: &str, url: Option<&str>);

    /// Overwrite the current entry.
    fn replace(&self, state: Value, title: &str, url: Option<&str>);

    /// Move `delta` entries through existing history. Out-of-range moves are ignored.
    fn go(&self, delta: i32);

    fn back(&self) {
        self.go(-1);
    }

    fn forward(&self) {
        self.go(1);
    }

    /// The location currently displayed in the address bar.
    fn location(&self) -> Location;

    /// Number of entries in the session history.
    fn length(&self) -> usize;
}
