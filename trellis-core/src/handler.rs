//! # Handlers and Resolution
//!
//! A [`Handler`] is anything that can be invoked with an [`Invocation`].
//! Instead of returning a final value it returns a [`Resolution`]: either a
//! [`Reply`] that ends the chain, or another handler to invoke next.
//!
//! Returning a continuation is how a handler acts as a factory ("build a
//! handler for this request") or as a method dispatcher ("pick `get` or
//! `post` and run it"). The chain is driven iteratively by a resolver with a
//! bounded depth, so termination never depends on recursion.
//!
//! # Usage Patterns
//!
//! 1. **Plain function**: `fn show(inv: &Invocation<'_>) -> Result<Context, Exception>`
//! 2. **Closure**: `handler_fn(|inv| ...)`
//! 3. **Struct implementation**: `impl Handler for MyView`

use crate::{
    context::{Context, Invocation},
    exception::Exception,
    response::Body,
};
use std::sync::Arc;

/// A shared, type-erased handler.
pub type BoxHandler = Arc<dyn Handler>;

/// What a fully resolved handler produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A mapping to be rendered by a negotiated output.
    Context(Context),
    /// A ready-made body, used as is.
    Body(Body),
    /// Nothing; yields an empty body.
    Empty,
}

/// The result of a single handler call.
pub enum Resolution {
    /// The chain is finished.
    Final(Reply),
    /// Invoke this handler next with the same invocation.
    Continue(BoxHandler),
}

impl Resolution {
    /// Continue the chain with `handler`.
    pub fn next(handler: impl Handler) -> Self {
        Resolution::Continue(Arc::new(handler))
    }

    /// Finish the chain with `reply`.
    pub fn done(reply: Reply) -> Self {
        Resolution::Final(reply)
    }
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Final(reply) => f.debug_tuple("Final").field(reply).finish(),
            Resolution::Continue(handler) => {
                f.debug_tuple("Continue").field(&handler.name()).finish()
            }
        }
    }
}

/// An invocable step in a dispatch chain.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Handler`",
    label = "missing `Handler` implementation",
    note = "Functions must take `&Invocation<'_>` and return a value implementing `IntoResolution`."
)]
pub trait Handler: Send + Sync + 'static {
    /// Invoke the handler.
    fn invoke(&self, invocation: &Invocation<'_>) -> Result<Resolution, Exception>;

    /// A name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Path parameter names this handler requires, if it declares any.
    fn declared_params(&self) -> Option<&[String]> {
        None
    }
}

impl<F, R> Handler for F
where
    F: Fn(&Invocation<'_>) -> R + Send + Sync + 'static,
    R: IntoResolution,
{
    fn invoke(&self, invocation: &Invocation<'_>) -> Result<Resolution, Exception> {
        (self)(invocation).into_resolution()
    }
}

/// Pin a closure's signature so it is accepted as a [`Handler`].
///
/// Closures passed straight to a generic `impl Handler` parameter cannot
/// infer a signature that is generic over the invocation lifetime.
pub fn handler_fn<F, R>(f: F) -> F
where
    F: Fn(&Invocation<'_>) -> R + Send + Sync + 'static,
    R: IntoResolution,
{
    f
}

/// A handler that declares the path parameters it requires.
///
/// Created by [`HandlerExt::with_params`]; used by strict route tables to
/// check handlers against their templates at registration time.
pub struct Declared<H> {
    inner: H,
    params: Vec<String>,
}

impl<H: Handler> Handler for Declared<H> {
    fn invoke(&self, invocation: &Invocation<'_>) -> Result<Resolution, Exception> {
        self.inner.invoke(invocation)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn declared_params(&self) -> Option<&[String]> {
        Some(&self.params)
    }
}

/// Combinators available on every handler.
pub trait HandlerExt: Handler + Sized {
    /// Declare the path parameters this handler requires.
    fn with_params<I, S>(self, names: I) -> Declared<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Declared {
            inner: self,
            params: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Erase the handler's type.
    fn boxed(self) -> BoxHandler {
        Arc::new(self)
    }
}

impl<H: Handler> HandlerExt for H {}

/// Conversion of handler return values into a [`Resolution`].
///
/// # Default Implementations
///
/// - `Context` / JSON object → `Reply::Context`
/// - `String`, `&'static str`, `Vec<u8>`, `Body` → `Reply::Body`
/// - `()`, `None`, JSON `null` → `Reply::Empty`
/// - `BoxHandler` → continue with that handler
/// - `Result<T, E>` → delegates to `T`, or raises `E` as an [`Exception`]
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be returned from a handler",
    label = "missing `IntoResolution` implementation"
)]
pub trait IntoResolution {
    /// Convert into a resolution, or raise.
    fn into_resolution(self) -> Result<Resolution, Exception>;
}

impl IntoResolution for Resolution {
    fn into_resolution(self) -> Result<Resolution, Exception> {
        Ok(self)
    }
}

impl IntoResolution for Reply {
    fn into_resolution(self) -> Result<Resolution, Exception> {
        Ok(Resolution::Final(self))
    }
}

impl IntoResolution for Context {
    fn into_resolution(self) -> Result<Resolution, Exception> {
        Ok(Resolution::Final(Reply::Context(self)))
    }
}

impl IntoResolution for serde_json::Value {
    fn into_resolution(self) -> Result<Resolution, Exception> {
        let reply = match self {
            serde_json::Value::Object(map) => Reply::Context(map),
            serde_json::Value::Null => Reply::Empty,
            serde_json::Value::String(text) => Reply::Body(Body::Text(text)),
            other => Reply::Body(Body::Text(other.to_string())),
        };
        Ok(Resolution::Final(reply))
    }
}

impl IntoResolution for Body {
    fn into_resolution(self) -> Result<Resolution, Exception> {
        Ok(Resolution::Final(Reply::Body(self)))
    }
}

impl IntoResolution for String {
    fn into_resolution(self) -> Result<Resolution, Exception> {
        Body::Text(self).into_resolution()
    }
}

impl IntoResolution for &'static str {
    fn into_resolution(self) -> Result<Resolution, Exception> {
        Body::from(self).into_resolution()
    }
}

impl IntoResolution for Vec<u8> {
    fn into_resolution(self) -> Result<Resolution, Exception> {
        Body::Bytes(self).into_resolution()
    }
}

impl IntoResolution for () {
    fn into_resolution(self) -> Result<Resolution, Exception> {
        Ok(Resolution::Final(Reply::Empty))
    }
}

impl IntoResolution for BoxHandler {
    fn into_resolution(self) -> Result<Resolution, Exception> {
        Ok(Resolution::Continue(self))
    }
}

impl<T: IntoResolution> IntoResolution for Option<T> {
    fn into_resolution(self) -> Result<Resolution, Exception> {
        match self {
            Some(value) => value.into_resolution(),
            None => Ok(Resolution::Final(Reply::Empty)),
        }
    }
}

impl<T, E> IntoResolution for Result<T, E>
where
    T: IntoResolution,
    E: Into<Exception>,
{
    fn into_resolution(self) -> Result<Resolution, Exception> {
        match self {
            Ok(value) => value.into_resolution(),
            Err(err) => Err(err.into()),
        }
    }
}
