//! Hardware back button (native app shells).
//!
//! The platform delivers a "back" key press instead of a browser traversal.
//! Anywhere but the root page it goes back one entry; on the root page the
//! host is told to exit.

use std::sync::Arc;

use serde::Serialize;

use crate::config::BackButtonConfig;
use crate::navigate::Router;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackButtonAction {
    NavigateBack,
    ExitApp,
}

pub struct HardwareBackButton {
    router: Arc<dyn Router>,
    root_path: String,
}

impl HardwareBackButton {
    pub fn new(router: Arc<dyn Router>, config: &BackButtonConfig) -> Self {
        Self {
            router,
            root_path: config.root_path.clone(),
        }
    }

    pub fn press(&self) -> BackButtonAction {
        let current = self.router.location();
        if current.pathname == self.root_path {
            tracing::info!(pathname = %current.pathname, "Back button at root, exiting app");
            return BackButtonAction::ExitApp;
        }

        tracing::debug!(pathname = %current.pathname, "Back button pressed");
        self.router.go(-1);
        BackButtonAction::NavigateBack
    }
}
