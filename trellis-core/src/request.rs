//! The parsed request handed in by the host server.

use crate::exception::{Exception, INVALID_REQUEST};

/// Raw request data as supplied by the host before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParts {
    /// Request method; empty means `GET`.
    pub method: String,
    /// Request path; empty means `/`.
    pub path: String,
    /// The `Accept` header, if the client sent one.
    pub accept: Option<String>,
}

impl RequestParts {
    /// Parts for `method` on `path` with no Accept header.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            accept: None,
        }
    }

    /// Set the Accept header.
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }
}

/// A validated request. Created once per incoming request and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    path: String,
    accept: Option<String>,
}

impl Request {
    /// Validate raw parts into a request.
    ///
    /// The method is upper-cased and must be an HTTP token. The path must
    /// start with `/` and may not contain whitespace or control characters.
    pub fn from_parts(parts: RequestParts) -> Result<Self, Exception> {
        let method = if parts.method.is_empty() {
            "GET".to_string()
        } else {
            parts.method.to_ascii_uppercase()
        };
        if !method.bytes().all(is_token_byte) {
            return Err(Exception::new(
                &INVALID_REQUEST,
                format!("`{}` is not a valid request method", parts.method),
            ));
        }

        let path = if parts.path.is_empty() {
            "/".to_string()
        } else {
            parts.path
        };
        if !path.starts_with('/') {
            return Err(Exception::new(
                &INVALID_REQUEST,
                format!("request path `{path}` must start with `/`"),
            ));
        }
        if path.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Exception::new(
                &INVALID_REQUEST,
                format!("request path {path:?} contains whitespace or control characters"),
            ));
        }

        Ok(Self {
            method,
            path,
            accept: parts.accept,
        })
    }

    /// The upper-cased request method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The Accept header, if present.
    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
