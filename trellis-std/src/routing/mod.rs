//! # Routing
//!
//! Two ordered tables drive dispatch:
//!
//! - [`RouteTable`]: path templates compiled by [`PathCompiler`], first full
//!   match wins.
//! - [`ExceptionTable`]: exception kinds, first registered ancestor wins.
//!
//! Both resolve the selected handler through a
//! [`Resolver`](crate::dispatch::Resolver) and hand back a [`Routed`] reply
//! together with the outputs the entry accepts.

mod exceptions;
mod pattern;
mod table;

pub use exceptions::{ExceptionRoute, ExceptionTable};
pub use pattern::{CompiledPattern, PathCompiler, PlaceholderKind};
pub use table::{Route, RouteMatch, RouteTable};

use crate::output::Output;
use trellis_core::Reply;

/// A resolved reply and the outputs of the entry that produced it.
#[derive(Debug)]
pub struct Routed<'a> {
    /// What the handler chain produced.
    pub reply: Reply,
    /// Outputs the matched entry accepts.
    pub outputs: &'a [Output],
}
