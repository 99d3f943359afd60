//! Navigation requests as they flow through the layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a URL change adds a history entry or overwrites the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    Push,
    Replace,
}

/// Who asked for a URL change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationOrigin {
    UserClick,
    Programmatic,
    BrowserBackForward,
    ThirdPartyScript,
}

impl fmt::Display for NavigationOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NavigationOrigin::UserClick => "user-click",
            NavigationOrigin::Programmatic => "programmatic",
            NavigationOrigin::BrowserBackForward => "browser-back-forward",
            NavigationOrigin::ThirdPartyScript => "third-party-script",
        };
        f.write_str(label)
    }
}

/// A requested URL change. Lives only while the request is being handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    pub target: String,
    pub mode: NavigationMode,
    pub origin: NavigationOrigin,
}

impl NavigationIntent {
    pub fn new(target: impl Into<String>, mode: NavigationMode, origin: NavigationOrigin) -> Self {
        Self {
            target: target.into(),
            mode,
            origin,
        }
    }

    pub fn push(target: impl Into<String>, origin: NavigationOrigin) -> Self {
        Self::new(target, NavigationMode::Push, origin)
    }

    pub fn replace(target: impl Into<String>, origin: NavigationOrigin) -> Self {
        Self::new(target, NavigationMode::Replace, origin)
    }
}
