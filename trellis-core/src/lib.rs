//! # trellis-core
//!
//! Core types for the Trellis request dispatch engine.
//!
//! This crate has minimal dependencies and holds the vocabulary shared by the
//! routing engines in `trellis-std` and the orchestrator in `trellis`:
//!
//! - [`Request`] / [`RequestParts`]: the parsed request supplied by the host
//! - [`Response`] / [`Body`]: what goes back to the host
//! - [`Handler`] / [`Resolution`] / [`Reply`]: invocable steps that either
//!   finish with a reply or hand over to another handler
//! - [`Invocation`]: the keyword context every handler receives
//! - [`Context`]: the insertion-ordered mapping producers build
//! - [`ExceptionType`] / [`Exception`]: the explicit exception hierarchy used
//!   for exception routing
//!
//! # Error Types
//!
//! - [`Error`] - Top-level error type
//! - [`ConfigurationError`] - Registration-time errors
//! - [`DispatchError`] - Per-request dispatch errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod context;
mod error;
pub mod exception;
mod handler;
mod request;
mod response;

// Re-exports
pub use context::{Context, Invocation, PathParams};
pub use error::{BoxError, ConfigurationError, DispatchError, Error};
pub use exception::{Exception, ExceptionType};
pub use handler::{
    BoxHandler, Declared, Handler, HandlerExt, IntoResolution, Reply, Resolution, handler_fn,
};
pub use request::{Request, RequestParts};
pub use response::{Body, Response};
