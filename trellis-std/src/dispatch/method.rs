//! Per-method handler selection.

use std::fmt;
use trellis_core::{
    BoxHandler, Exception, Handler, HandlerExt, Invocation, Resolution,
    exception::METHOD_NOT_ALLOWED,
};

/// Picks a handler by request method and continues the chain with it.
///
/// `HEAD` falls back to the `GET` handler when none is registered for it.
/// Methods without a handler raise `MethodNotAllowed`.
///
/// ```rust
/// use serde_json::json;
/// use trellis_core::Invocation;
/// use trellis_std::dispatch::MethodDispatch;
///
/// let item = MethodDispatch::new()
///     .get(|_: &Invocation<'_>| json!({"called": "get"}))
///     .post(|_: &Invocation<'_>| json!({"called": "post"}));
/// assert_eq!(item.allowed(), vec!["GET", "POST"]);
/// ```
#[derive(Default, Clone)]
pub struct MethodDispatch {
    handlers: Vec<(String, BoxHandler)>,
}

impl MethodDispatch {
    /// A dispatcher with no methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle `method` with `handler`, replacing any earlier registration.
    pub fn on(mut self, method: &str, handler: impl Handler) -> Self {
        let method = method.to_ascii_uppercase();
        let handler = handler.boxed();
        match self.handlers.iter_mut().find(|(m, _)| *m == method) {
            Some(slot) => slot.1 = handler,
            None => self.handlers.push((method, handler)),
        }
        self
    }

    /// Handle `GET`.
    pub fn get(self, handler: impl Handler) -> Self {
        self.on("GET", handler)
    }

    /// Handle `POST`.
    pub fn post(self, handler: impl Handler) -> Self {
        self.on("POST", handler)
    }

    /// Handle `PUT`.
    pub fn put(self, handler: impl Handler) -> Self {
        self.on("PUT", handler)
    }

    /// Handle `DELETE`.
    pub fn delete(self, handler: impl Handler) -> Self {
        self.on("DELETE", handler)
    }

    /// Handle `PATCH`.
    pub fn patch(self, handler: impl Handler) -> Self {
        self.on("PATCH", handler)
    }

    /// Registered methods in registration order.
    pub fn allowed(&self) -> Vec<&str> {
        self.handlers.iter().map(|(m, _)| m.as_str()).collect()
    }

    fn lookup(&self, method: &str) -> Option<&BoxHandler> {
        let find = |wanted: &str| {
            self.handlers
                .iter()
                .find(|(m, _)| m.eq_ignore_ascii_case(wanted))
                .map(|(_, h)| h)
        };
        find(method).or_else(|| {
            if method.eq_ignore_ascii_case("HEAD") {
                find("GET")
            } else {
                None
            }
        })
    }
}

impl Handler for MethodDispatch {
    fn invoke(&self, invocation: &Invocation<'_>) -> Result<Resolution, Exception> {
        let method = invocation.method().unwrap_or("GET");
        self.lookup(method)
            .map(|handler| Resolution::Continue(handler.clone()))
            .ok_or_else(|| {
                Exception::new(
                    &METHOD_NOT_ALLOWED,
                    format!(
                        "method `{method}` is not allowed; expected one of {:?}",
                        self.allowed()
                    ),
                )
            })
    }

    fn name(&self) -> &str {
        "MethodDispatch"
    }
}

impl fmt::Debug for MethodDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDispatch")
            .field("allowed", &self.allowed())
            .finish()
    }
}
