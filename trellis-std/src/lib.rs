//! # trellis-std
//!
//! Standard engines for the Trellis request dispatch core.
//!
//! This crate provides:
//! - **Routing**: [`PathCompiler`](routing::PathCompiler), [`RouteTable`](routing::RouteTable),
//!   [`ExceptionTable`](routing::ExceptionTable)
//! - **Dispatch**: [`Resolver`](dispatch::Resolver), [`View`](dispatch::View),
//!   [`MethodDispatch`](dispatch::MethodDispatch)
//! - **Outputs**: [`json`](output::json()), [`template`](output::template()),
//!   [`Negotiator`](output::Negotiator)
//! - **Testing**: request builders and recording handlers

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use trellis_core;

// Modules
pub mod dispatch;
pub mod output;
pub mod routing;
pub mod testing;
