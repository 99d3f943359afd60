//! Scroll restoration on route changes.

mod restorer;
mod viewport;

pub use restorer::{ScrollOutcome, ScrollRestorationRequest, ScrollRestorer, ScrollTarget};
pub use viewport::{MemoryViewport, ScrollBehavior, ScrollPosition, ScrollRecord, Viewport};
