use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

/// How a scroll is animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    /// Jump without animation.
    Instant,
    Smooth,
}

/// The document scroll primitives the restorer needs.
pub trait Viewport: Send + Sync {
    /// Scroll the window to (0, 0).
    fn scroll_to_origin(&self, behavior: ScrollBehavior);

    /// Scroll the element with `element_id` into view.
    /// Returns false, without scrolling, if no such element exists.
    fn scroll_into_view(&self, element_id: &str, behavior: ScrollBehavior) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
}

/// One scroll the viewport actually performed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollRecord {
    pub position: ScrollPosition,
    pub behavior: ScrollBehavior,
    pub element_id: Option<String>,
}

/// In-memory document: element offsets plus the window scroll position.
#[derive(Clone, Default)]
pub struct MemoryViewport {
    inner: Arc<Mutex<ViewportInner>>,
}

#[derive(Default)]
struct ViewportInner {
    elements: HashMap<String, f64>,
    position: ScrollPosition,
    log: Vec<ScrollRecord>,
}

impl MemoryViewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or move) an element whose top edge sits at `top`.
    pub fn insert_element(&self, id: impl Into<String>, top: f64) {
        self.inner.lock().elements.insert(id.into(), top);
    }

    pub fn remove_element(&self, id: &str) {
        self.inner.lock().elements.remove(id);
    }

    /// Simulate the user scrolling.
    pub fn set_position(&self, position: ScrollPosition) {
        self.inner.lock().position = position;
    }

    pub fn position(&self) -> ScrollPosition {
        self.inner.lock().position
    }

    /// Scrolls performed through the [`Viewport`] trait, oldest first.
    pub fn scroll_log(&self) -> Vec<ScrollRecord> {
        self.inner.lock().log.clone()
    }
}

impl Viewport for MemoryViewport {
    fn scroll_to_origin(&self, behavior: ScrollBehavior) {
        let inner = &mut *self.inner.lock();
        inner.position = ScrollPosition::default();
        inner.log.push(ScrollRecord {
            position: inner.position,
            behavior,
            element_id: None,
        });
    }

    fn scroll_into_view(&self, element_id: &str, behavior: ScrollBehavior) -> bool {
        let inner = &mut *self.inner.lock();
        let Some(top) = inner.elements.get(element_id).copied() else {
            return false;
        };
        inner.position = ScrollPosition { x: 0.0, y: top };
        inner.log.push(ScrollRecord {
            position: inner.position,
            behavior,
            element_id: Some(element_id.to_string()),
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_into_view_moves_and_logs() {
        let viewport = MemoryViewport::new();
        viewport.insert_element("faq", 420.0);

        assert!(viewport.scroll_into_view("faq", ScrollBehavior::Smooth));
        assert_eq!(viewport.position(), ScrollPosition { x: 0.0, y: 420.0 });

        let log = viewport.scroll_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].position.y, 420.0);
        assert_eq!(log[0].element_id.as_deref(), Some("faq"));
    }

    #[test]
    fn missing_element_is_not_scrolled() {
        let viewport = MemoryViewport::new();
        viewport.set_position(ScrollPosition { x: 0.0, y: 90.0 });

        assert!(!viewport.scroll_into_view("gone", ScrollBehavior::Smooth));
        assert_eq!(viewport.position().y, 90.0);
        assert!(viewport.scroll_log().is_empty());
    }

    #[test]
    fn scroll_to_origin_resets_position() {
        let viewport = MemoryViewport::new();
        viewport.set_position(ScrollPosition { x: 10.0, y: 300.0 });

        viewport.scroll_to_origin(ScrollBehavior::Instant);

        assert_eq!(viewport.position(), ScrollPosition::default());
        assert_eq!(viewport.scroll_log()[0].behavior, ScrollBehavior::Instant);
    }
}
