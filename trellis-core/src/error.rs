//! Error types for Trellis.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`Error`] - Top-level error type for all Trellis operations
//! - [`ConfigurationError`] - Bad registration input, raised at configuration time
//! - [`DispatchError`] - Failures while dispatching a single request
//!
//! Handlers do not return these directly; they raise an [`Exception`], and
//! both error types convert into one carrying a built-in exception kind.

use crate::exception::Exception;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Trellis operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A registration was rejected.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A request could not be dispatched.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Errors raised while configuring routes, exception handlers and outputs.
///
/// These always surface at registration time and are never swallowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The raw path template was already registered.
    #[error("`{template}` has already been added to this route table")]
    DuplicateRoute {
        /// The rejected template.
        template: String,
    },

    /// The exact exception kind was already registered.
    #[error("`{kind}` has already been added to this exception table")]
    DuplicateErrorHandler {
        /// Name of the rejected exception kind.
        kind: &'static str,
    },

    /// A placeholder used a `!kind` suffix that no converter is registered for.
    #[error("unknown placeholder kind `{kind}` in template `{template}`")]
    UnknownPlaceholderKind {
        /// The template being compiled.
        template: String,
        /// The unrecognised kind.
        kind: String,
    },

    /// The template could not be turned into a pattern.
    #[error("invalid path template `{template}`: {reason}")]
    InvalidTemplate {
        /// The template being compiled.
        template: String,
        /// What went wrong.
        reason: String,
    },

    /// The handler declares different parameters than the template captures.
    #[error(
        "handler for `{template}` declares parameters {declared:?} but the template captures {expected:?}"
    )]
    ArityMismatch {
        /// The template being registered.
        template: String,
        /// Placeholder names in the template.
        expected: Vec<String>,
        /// Parameter names the handler declared.
        declared: Vec<String>,
    },

    /// A producer in an aggregated view returned a body instead of a mapping.
    #[error("producer #{index} yielded a response body; producers must yield a mapping")]
    ProducerYieldedBody {
        /// Zero-based position of the producer.
        index: usize,
    },

    /// An application setting is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors that can occur while dispatching a request.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No registered path pattern matches the request path.
    #[error("`{path}` does not match any of the given routes: {routes:?}")]
    NoRoute {
        /// The attempted path.
        path: String,
        /// Every registered raw template, sorted.
        routes: Vec<String>,
    },

    /// No registered exception kind is an ancestor of the raised exception.
    #[error("`{kind}` does not match any registered exception handler: {registered:?}")]
    NoErrorHandler {
        /// Name of the unhandled exception's kind.
        kind: &'static str,
        /// Every registered exception kind, sorted.
        registered: Vec<&'static str>,
        /// The exception that could not be routed.
        exception: Box<Exception>,
    },

    /// Content negotiation found no output matching the Accept header.
    #[error("unable to find a renderer given accept `{accept}` and offered media types {offered:?}")]
    NoOutputHandler {
        /// The request's Accept header (empty when absent).
        accept: String,
        /// Every media type the candidate outputs declared.
        offered: Vec<String>,
    },

    /// A negotiated output cannot render because a collaborator is missing.
    #[error("output `{output}` cannot render: {reason}")]
    RendererUnavailable {
        /// Name of the output.
        output: String,
        /// What is missing.
        reason: String,
    },

    /// A negotiated output failed while rendering.
    #[error("output `{output}` failed to render")]
    RenderFailed {
        /// Name of the output.
        output: String,
        /// The underlying failure.
        #[source]
        source: BoxError,
    },

    /// A handler kept returning handlers past the resolution limit.
    #[error("handler resolution did not finish within {limit} calls")]
    ResolutionDepthExceeded {
        /// The configured limit.
        limit: usize,
    },

    /// An exception handler itself failed. Never re-dispatched.
    #[error("exception handler failed: {0}")]
    Unhandled(Box<Exception>),

    /// A configuration problem discovered while dispatching.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl DispatchError {
    /// Returns true for errors raised by content negotiation or rendering.
    pub fn is_output_error(&self) -> bool {
        matches!(
            self,
            DispatchError::NoOutputHandler { .. }
                | DispatchError::RendererUnavailable { .. }
                | DispatchError::RenderFailed { .. }
        )
    }
}
