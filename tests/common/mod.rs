//! Shared test utilities.

#![allow(dead_code, unused_imports)]

use navguard::app::NavigationTab;
use navguard::bus::{NavigationEvent, Priority, Subscription};
use navguard::clock::ManualScheduler;
use navguard::config::NavigationConfig;
use navguard::history::HistoryController;
use navguard::scroll::MemoryViewport;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// A tab over virtual time with an inspectable viewport and an event log.
pub struct Harness {
    pub tab: NavigationTab,
    pub scheduler: ManualScheduler,
    pub viewport: MemoryViewport,
    events: Arc<Mutex<Vec<NavigationEvent>>>,
    _recorder: Subscription,
}

impl Harness {
    pub fn new(initial_url: &str) -> Self {
        Self::with_config(initial_url, NavigationConfig::default())
    }

    pub fn with_config(initial_url: &str, config: NavigationConfig) -> Self {
        let scheduler = ManualScheduler::new();
        let viewport = MemoryViewport::new();
        let tab = NavigationTab::bootstrap(
            config,
            Arc::new(scheduler.clone()),
            initial_url,
            Arc::new(viewport.clone()),
        );

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let recorder = tab.bus().subscribe(Priority::Monitor, move |event| {
            sink.lock().push(event.clone());
        });

        Self {
            tab,
            scheduler,
            viewport,
            events,
            _recorder: recorder,
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.scheduler.advance(Duration::from_millis(ms));
    }

    /// Canonical keys of every session history entry.
    pub fn history_keys(&self) -> Vec<String> {
        self.tab
            .session()
            .entries()
            .iter()
            .map(|e| e.location.key().to_string())
            .collect()
    }

    pub fn browser_path(&self) -> String {
        self.tab.browser_location().pathname
    }

    pub fn events(&self) -> Vec<NavigationEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events with the given name.
    pub fn count(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|e| e.name() == name).count()
    }

    pub fn clear_events(&self) {
        self.events.lock().clear();
    }
}

/// Write `content` to a file named `name` inside a fresh temp dir.
pub fn temp_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write temp file");
    (temp_dir, path)
}
