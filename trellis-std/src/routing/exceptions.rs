//! Exception routing.
//!
//! Entries are keyed by [`ExceptionType`] and tried in registration order.
//! An entry matches when its kind is the raised kind or one of its
//! ancestors, so registering a subtype after its parent means the parent
//! always wins. Register specific kinds first.

use super::Routed;
use crate::{dispatch::Resolver, output::Output};
use std::fmt;
use trellis_core::{
    BoxHandler, ConfigurationError, DispatchError, Exception, ExceptionType, Handler, HandlerExt,
    Invocation, Request,
};

/// An exception kind bound to a handler and the outputs it accepts.
pub struct ExceptionRoute {
    kind: &'static ExceptionType,
    handler: BoxHandler,
    outputs: Vec<Output>,
}

impl ExceptionRoute {
    /// The registered kind.
    pub fn kind(&self) -> &'static ExceptionType {
        self.kind
    }

    /// The handler.
    pub fn handler(&self) -> &BoxHandler {
        &self.handler
    }

    /// Outputs this entry accepts. Empty means "use the application defaults".
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }
}

impl fmt::Debug for ExceptionRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionRoute")
            .field("kind", &self.kind.name())
            .field("handler", &self.handler.name())
            .finish()
    }
}

/// Exception handlers matched by kind, first registered first tried.
#[derive(Default)]
pub struct ExceptionTable {
    routes: Vec<ExceptionRoute>,
}

impl ExceptionTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler for `kind`.
    ///
    /// Only the exact kind is checked for duplicates; a subtype and its
    /// parent may both be registered.
    pub fn register<H, O>(
        &mut self,
        kind: &'static ExceptionType,
        handler: H,
        outputs: O,
    ) -> Result<&mut Self, ConfigurationError>
    where
        H: Handler,
        O: IntoIterator<Item = Output>,
    {
        self.register_boxed(kind, handler.boxed(), outputs)
    }

    /// Append an already type-erased handler for `kind`.
    pub fn register_boxed<O>(
        &mut self,
        kind: &'static ExceptionType,
        handler: BoxHandler,
        outputs: O,
    ) -> Result<&mut Self, ConfigurationError>
    where
        O: IntoIterator<Item = Output>,
    {
        if self.routes.iter().any(|route| std::ptr::eq(route.kind, kind)) {
            return Err(ConfigurationError::DuplicateErrorHandler { kind: kind.name() });
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(kind = kind.name(), handler = handler.name(), "error handler registered");
        self.routes.push(ExceptionRoute {
            kind,
            handler,
            outputs: outputs.into_iter().collect(),
        });
        Ok(self)
    }

    /// The first entry whose kind is an ancestor-or-self of the exception's.
    pub fn find(&self, exception: &Exception) -> Option<&ExceptionRoute> {
        self.routes.iter().find(|route| exception.is_a(route.kind))
    }

    /// Route `exception` to its handler and resolve it.
    ///
    /// A failure inside the handler is returned as
    /// [`DispatchError::Unhandled`] and is never routed again.
    pub fn dispatch<'a>(
        &'a self,
        exception: &Exception,
        request: Option<&Request>,
        resolver: &Resolver,
    ) -> Result<Routed<'a>, DispatchError> {
        let route = self
            .find(exception)
            .ok_or_else(|| DispatchError::NoErrorHandler {
                kind: exception.kind().name(),
                registered: self.kinds(),
                exception: Box::new(exception.clone()),
            })?;

        let invocation = Invocation::for_exception(exception, request);
        let reply = resolver
            .resolve(route.handler.as_ref(), &invocation)
            .map_err(|failure| DispatchError::Unhandled(Box::new(failure)))?;

        Ok(Routed {
            reply,
            outputs: &route.outputs,
        })
    }

    /// Every registered kind name, sorted.
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.routes.iter().map(|route| route.kind.name()).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true when no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ExceptionRoute> {
        self.routes.iter()
    }
}

impl fmt::Debug for ExceptionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionTable")
            .field("routes", &self.routes)
            .finish()
    }
}
