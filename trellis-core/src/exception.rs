//! Exception kinds and runtime exception values.
//!
//! Exception routing needs an "is-a" relation between error kinds. Rust has
//! no runtime class hierarchy, so every kind is a static [`ExceptionType`]
//! tag that names its parent explicitly:
//!
//! ```rust
//! use trellis_core::{Exception, ExceptionType};
//!
//! static VALUE_ERROR: ExceptionType = ExceptionType::root("ValueError");
//! static BAD_ID: ExceptionType = ExceptionType::subtype("BadId", &VALUE_ERROR);
//!
//! let exc = Exception::new(&BAD_ID, "id must be numeric");
//! assert!(exc.is_a(&VALUE_ERROR));
//! assert!(!VALUE_ERROR.is_a(&BAD_ID));
//! ```
//!
//! A kind's identity is the address of its `static`; the name is only for
//! display. Two statics with the same name are different kinds. Every kind
//! descends from [`ANY`].

use crate::error::{ConfigurationError, DispatchError};
use std::{fmt, sync::Arc};

/// A type tag in the exception hierarchy.
#[derive(Debug)]
pub struct ExceptionType {
    name: &'static str,
    parent: Option<&'static ExceptionType>,
}

impl ExceptionType {
    /// A kind with no parent other than [`ANY`].
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// A kind that is-a `parent`.
    pub const fn subtype(name: &'static str, parent: &'static ExceptionType) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    /// The kind's display name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The declared parent kind.
    pub const fn parent(&self) -> Option<&'static ExceptionType> {
        self.parent
    }

    /// Returns true when `ancestor` is this kind or one of its ancestors.
    pub fn is_a(&self, ancestor: &ExceptionType) -> bool {
        if std::ptr::eq(ancestor, &ANY) {
            return true;
        }
        self.lineage().any(|kind| std::ptr::eq(kind, ancestor))
    }

    /// Iterates from this kind up through its parents.
    pub fn lineage(&self) -> impl Iterator<Item = &ExceptionType> {
        std::iter::successors(Some(self), |kind| kind.parent)
    }
}

impl PartialEq for ExceptionType {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for ExceptionType {}

impl fmt::Display for ExceptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Ancestor of every exception kind.
pub static ANY: ExceptionType = ExceptionType::root("Any");

/// Failures produced by the dispatch machinery itself.
pub static DISPATCH_ERROR: ExceptionType = ExceptionType::subtype("DispatchError", &ANY);

/// No route matched the request path.
pub static NO_ROUTE: ExceptionType = ExceptionType::subtype("NoRoute", &DISPATCH_ERROR);

/// Content negotiation or rendering found no usable output.
pub static NO_OUTPUT_HANDLER: ExceptionType =
    ExceptionType::subtype("NoOutputHandler", &DISPATCH_ERROR);

/// A handler chain did not settle within the resolution limit.
pub static RESOLUTION_DEPTH_EXCEEDED: ExceptionType =
    ExceptionType::subtype("ResolutionDepthExceeded", &DISPATCH_ERROR);

/// A handler or producer broke its contract.
pub static CONFIGURATION_ERROR: ExceptionType =
    ExceptionType::subtype("ConfigurationError", &DISPATCH_ERROR);

/// The incoming request is malformed.
pub static INVALID_REQUEST: ExceptionType = ExceptionType::subtype("InvalidRequest", &ANY);

/// A path parameter is missing or cannot be converted.
pub static INVALID_PARAMETER: ExceptionType =
    ExceptionType::subtype("InvalidParameter", &INVALID_REQUEST);

/// The request method has no handler.
pub static METHOD_NOT_ALLOWED: ExceptionType =
    ExceptionType::subtype("MethodNotAllowed", &INVALID_REQUEST);

/// A runtime exception raised by a handler or by the dispatcher.
#[derive(Debug, Clone)]
pub struct Exception {
    kind: &'static ExceptionType,
    message: String,
    source: Option<Arc<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Exception {
    /// Create an exception of `kind`.
    pub fn new(kind: &'static ExceptionType, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an error as an exception of `kind`, keeping it as the source.
    pub fn from_error<E>(kind: &'static ExceptionType, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            kind,
            message: error.to_string(),
            source: Some(Arc::new(error)),
        }
    }

    /// Attach a source error.
    pub fn with_source<E>(mut self, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(error));
        self
    }

    /// The exception's kind.
    pub fn kind(&self) -> &'static ExceptionType {
        self.kind
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true when this exception's kind is-a `kind`.
    pub fn is_a(&self, kind: &ExceptionType) -> bool {
        self.kind.is_a(kind)
    }

    /// Downcast the source error, if any.
    pub fn downcast_source<T>(&self) -> Option<&T>
    where
        T: std::error::Error + 'static,
    {
        self.source.as_deref().and_then(|source| source.downcast_ref::<T>())
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Exception {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}

impl From<DispatchError> for Exception {
    fn from(error: DispatchError) -> Self {
        let kind = match &error {
            DispatchError::NoRoute { .. } => &NO_ROUTE,
            DispatchError::NoOutputHandler { .. }
            | DispatchError::RendererUnavailable { .. }
            | DispatchError::RenderFailed { .. } => &NO_OUTPUT_HANDLER,
            DispatchError::ResolutionDepthExceeded { .. } => &RESOLUTION_DEPTH_EXCEEDED,
            DispatchError::Configuration(_) => &CONFIGURATION_ERROR,
            DispatchError::NoErrorHandler { .. } | DispatchError::Unhandled(_) => &DISPATCH_ERROR,
        };
        Exception::from_error(kind, error)
    }
}

impl From<ConfigurationError> for Exception {
    fn from(error: ConfigurationError) -> Self {
        Exception::from_error(&CONFIGURATION_ERROR, error)
    }
}
