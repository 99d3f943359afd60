//! Client-side navigation and history consistency layer for a single-page
//! app: a history guard against duplicate pushes, a back-navigation
//! detector, a safe-navigate façade, and scroll restoration on route change.

pub mod app;
pub mod back_button;
pub mod bus;
pub mod clock;
pub mod config;
pub mod detector;
pub mod diagnostics;
pub mod guard;
pub mod history;
pub mod intent;
pub mod location;
pub mod logging;
pub mod navigate;
pub mod scenario;
pub mod scroll;
