//! Per-call context: captured path parameters, the merged producer context,
//! and the keyword bundle every handler receives.

use crate::{
    exception::{Exception, INVALID_PARAMETER},
    request::Request,
};
use std::{fmt::Display, str::FromStr};

/// The merged mapping built from producer results.
///
/// Backed by `serde_json::Map` with `preserve_order`, so keys iterate in
/// insertion order and re-inserting an existing key keeps its position.
pub type Context = serde_json::Map<String, serde_json::Value>;

static NO_PARAMS: PathParams = PathParams::new();

/// Path parameters captured from a route's named groups, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    entries: Vec<(String, String)>,
}

impl PathParams {
    /// An empty set of parameters.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a captured parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

/// The keyword context a handler is invoked with.
///
/// Route handlers see the request and captured parameters. Exception
/// handlers see the exception and, when one was built, the request.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    request: Option<&'a Request>,
    params: &'a PathParams,
    exception: Option<&'a Exception>,
}

impl<'a> Invocation<'a> {
    /// An invocation with no request, parameters or exception.
    pub fn empty() -> Self {
        Self {
            request: None,
            params: &NO_PARAMS,
            exception: None,
        }
    }

    /// The invocation for a matched route.
    pub fn for_route(request: &'a Request, params: &'a PathParams) -> Self {
        Self {
            request: Some(request),
            params,
            exception: None,
        }
    }

    /// The invocation for an exception handler.
    pub fn for_exception(exception: &'a Exception, request: Option<&'a Request>) -> Self {
        Self {
            request,
            params: &NO_PARAMS,
            exception: Some(exception),
        }
    }

    /// Replace the captured parameters.
    pub fn with_params(mut self, params: &'a PathParams) -> Self {
        self.params = params;
        self
    }

    /// Replace the request.
    pub fn with_request(mut self, request: &'a Request) -> Self {
        self.request = Some(request);
        self
    }

    /// The request, when one was built.
    pub fn request(&self) -> Option<&'a Request> {
        self.request
    }

    /// The request method, when a request was built.
    pub fn method(&self) -> Option<&'a str> {
        self.request.map(Request::method)
    }

    /// The exception being handled, for exception handlers.
    pub fn exception(&self) -> Option<&'a Exception> {
        self.exception
    }

    /// All captured path parameters.
    pub fn params(&self) -> &'a PathParams {
        self.params
    }

    /// A captured path parameter as text.
    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.params.get(name)
    }

    /// A captured path parameter parsed into `T`.
    ///
    /// A missing or unparsable value raises an `InvalidParameter` exception.
    pub fn param_as<T>(&self, name: &str) -> Result<T, Exception>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.param(name).ok_or_else(|| {
            Exception::new(
                &INVALID_PARAMETER,
                format!("missing path parameter `{name}`"),
            )
        })?;
        raw.parse().map_err(|err| {
            Exception::new(
                &INVALID_PARAMETER,
                format!("path parameter `{name}` = `{raw}`: {err}"),
            )
        })
    }
}
