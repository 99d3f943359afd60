//! Router collaborator and the safe-navigate façade.

mod router;
mod safe;

pub use router::{MemoryRouter, Router};
pub use safe::{NavigateOptions, NavigateOutcome, NavigationTarget, SafeNavigator};
