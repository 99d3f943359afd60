use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration container.
///
/// Every timing threshold used by the navigation layer lives here so it can
/// be tuned per target environment (mobile browsers need longer windows
/// than desktop ones).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NavigationConfig {
    #[serde(default)]
    pub guard: GuardConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub back_button: BackButtonConfig,
}

/// History mutation guard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Whether same-URL rapid pushes are coalesced into replaces (default: true).
    #[serde(default = "default_guard_enabled")]
    pub enabled: bool,
    /// Two same-URL pushes closer than this are treated as spam (default: 30).
    #[serde(default = "default_rapid_window_ms")]
    pub rapid_window_ms: u64,
    /// How long a programmatic-navigation mark stays set (default: 100).
    #[serde(default = "default_programmatic_reset_ms")]
    pub programmatic_reset_ms: u64,
}

/// Back-navigation detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// How long a traversal counts as "back navigation in progress" (default: 500).
    #[serde(default = "default_decay_window_ms")]
    pub decay_window_ms: u64,
}

/// Scroll restoration delays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Delay before scrolling after a forward navigation (default: 0).
    #[serde(default = "default_forward_delay_ms")]
    pub forward_delay_ms: u64,
    /// Delay before scrolling to top after a back navigation (default: 50).
    #[serde(default = "default_back_delay_ms")]
    pub back_delay_ms: u64,
    /// Delay before scrolling to an anchor after a back navigation (default: 150).
    #[serde(default = "default_back_anchor_delay_ms")]
    pub back_anchor_delay_ms: u64,
}

/// Router collaborator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Delay after a traversal before checking browser/router URL drift (default: 10).
    #[serde(default = "default_resync_delay_ms")]
    pub resync_delay_ms: u64,
}

/// Developer diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DiagnosticsConfig {
    /// Log every navigation event at debug level (default: false).
    #[serde(default)]
    pub monitor: bool,
}

/// Hardware back button behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackButtonConfig {
    /// Pathname at which the back button exits the app instead (default: "/").
    #[serde(default = "default_root_path")]
    pub root_path: String,
}

fn default_guard_enabled() -> bool {
    true
}

fn default_rapid_window_ms() -> u64 {
    30
}

fn default_programmatic_reset_ms() -> u64 {
    100
}

fn default_decay_window_ms() -> u64 {
    500
}

fn default_forward_delay_ms() -> u64 {
    0
}

fn default_back_delay_ms() -> u64 {
    50
}

fn default_back_anchor_delay_ms() -> u64 {
    150
}

fn default_resync_delay_ms() -> u64 {
    10
}

fn default_root_path() -> String {
    "/".to_string()
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            enabled: default_guard_enabled(),
            rapid_window_ms: default_rapid_window_ms(),
            programmatic_reset_ms: default_programmatic_reset_ms(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            decay_window_ms: default_decay_window_ms(),
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            forward_delay_ms: default_forward_delay_ms(),
            back_delay_ms: default_back_delay_ms(),
            back_anchor_delay_ms: default_back_anchor_delay_ms(),
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            resync_delay_ms: default_resync_delay_ms(),
        }
    }
}

impl Default for BackButtonConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
        }
    }
}

impl GuardConfig {
    pub fn rapid_window(&self) -> Duration {
        Duration::from_millis(self.rapid_window_ms)
    }

    pub fn programmatic_reset(&self) -> Duration {
        Duration::from_millis(self.programmatic_reset_ms)
    }
}

impl DetectorConfig {
    pub fn decay_window(&self) -> Duration {
        Duration::from_millis(self.decay_window_ms)
    }
}

impl ScrollConfig {
    /// Picks the delay for a restoration attempt.
    pub fn delay_for(&self, after_back_navigation: bool, has_anchor: bool) -> Duration {
        let ms = match (after_back_navigation, has_anchor) {
            (false, _) => self.forward_delay_ms,
            (true, false) => self.back_delay_ms,
            (true, true) => self.back_anchor_delay_ms,
        };
        Duration::from_millis(ms)
    }
}

impl RouterConfig {
    pub fn resync_delay(&self) -> Duration {
        Duration::from_millis(self.resync_delay_ms)
    }
}
