//! Navigation layer configuration.
//!
//! All timing heuristics (rapid-push window, back-navigation decay,
//! scroll delays) are loaded from TOML and injected into components at
//! construction time.

mod loader;
mod types;

pub use loader::{ConfigError, MAX_DECAY_WINDOW_MS, MAX_RAPID_WINDOW_MS};
pub use types::{
    BackButtonConfig, DetectorConfig, DiagnosticsConfig, GuardConfig, NavigationConfig,
    RouterConfig, ScrollConfig,
};
