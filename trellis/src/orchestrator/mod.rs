//! # Dispatch Orchestrator
//!
//! [`App`] wires the engines together for one request:
//!
//! ```text
//! RequestBuilding -> RouteLookup -> HandlerExecution -> Rendering -> Responded
//!        \_______________\_______________\_________________\
//!                                                            ErrorDispatch
//! ```
//!
//! A failure in any of the first four stages is routed once through the
//! exception table. A failure while doing so is returned to the caller.

mod app;
mod stage;

pub use app::{App, Mount};
pub use stage::Stage;
