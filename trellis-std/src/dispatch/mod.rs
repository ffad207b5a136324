//! # Handler Dispatch
//!
//! - [`Resolver`]: drives a handler chain to its final [`Reply`](trellis_core::Reply)
//! - [`aggregate`] / [`View`]: merge the mappings of several producers
//! - [`MethodDispatch`]: continue with a handler chosen by request method

mod aggregate;
mod method;
mod resolve;

pub use aggregate::{View, aggregate};
pub use method::MethodDispatch;
pub use resolve::{DEFAULT_MAX_RESOLUTION_DEPTH, Resolver};
