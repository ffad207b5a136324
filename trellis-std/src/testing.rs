//! Testing utilities for Trellis.
//!
//! This module provides helpers to make testing routes and handlers easier.
//!
//! # Features
//!
//! - [`TestRequest`]: A request builder with sensible defaults
//! - [`RecordingHandler`]: A handler that records every invocation it receives
//! - [`CountingHandler`]: A handler that counts invocations
//! - [`FailingHandler`]: A handler that always raises

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};
use trellis_core::{
    Exception, ExceptionType, Handler, Invocation, PathParams, Reply, Request, RequestParts,
    Resolution,
};

// ============================================================================
// Test Request
// ============================================================================

/// Builds [`Request`]s for tests.
///
/// # Example
///
/// ```rust
/// use trellis_std::testing::TestRequest;
///
/// let request = TestRequest::post("/items/").accept("application/json").build();
/// assert_eq!(request.method(), "POST");
/// assert_eq!(request.accept(), Some("application/json"));
/// ```
#[derive(Debug, Clone)]
pub struct TestRequest {
    parts: RequestParts,
}

impl TestRequest {
    /// A request for `method` and `path`.
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            parts: RequestParts::new(method, path),
        }
    }

    /// A `GET` request.
    pub fn get(path: &str) -> Self {
        Self::new("GET", path)
    }

    /// A `POST` request.
    pub fn post(path: &str) -> Self {
        Self::new("POST", path)
    }

    /// Set the `Accept` header.
    pub fn accept(mut self, accept: &str) -> Self {
        self.parts = self.parts.accept(accept);
        self
    }

    /// The unvalidated parts.
    pub fn parts(&self) -> RequestParts {
        self.parts.clone()
    }

    /// Build the request.
    ///
    /// # Panics
    ///
    /// Panics if the parts do not form a valid request.
    pub fn build(&self) -> Request {
        match Request::from_parts(self.parts()) {
            Ok(request) => request,
            Err(err) => panic!("invalid test request: {err}"),
        }
    }
}

// ============================================================================
// Recording Handler
// ============================================================================

/// What a [`RecordingHandler`] saw on one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    /// The request method, when a request was present.
    pub method: Option<String>,
    /// The request path, when a request was present.
    pub path: Option<String>,
    /// Captured path parameters.
    pub params: PathParams,
    /// Kind name of the exception being handled, for exception handlers.
    pub exception: Option<&'static str>,
}

/// A handler that records all invocations it receives.
///
/// Useful for verifying that requests are being routed correctly.
///
/// # Example
///
/// ```rust
/// use trellis_core::{Handler, Invocation};
/// use trellis_std::testing::RecordingHandler;
///
/// let recorder = RecordingHandler::new();
/// let recorder_clone = recorder.clone();
///
/// recorder.invoke(&Invocation::empty()).unwrap();
///
/// assert_eq!(recorder_clone.count(), 1);
/// ```
#[derive(Clone)]
pub struct RecordingHandler {
    calls: Arc<Mutex<Vec<Recorded>>>,
    reply: Reply,
}

impl RecordingHandler {
    /// A recording handler that replies with nothing.
    pub fn new() -> Self {
        Self::with_reply(Reply::Empty)
    }

    /// A recording handler that replies with `reply`.
    pub fn with_reply(reply: Reply) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            reply,
        }
    }

    /// A clone of the recorded invocations.
    pub fn calls(&self) -> Vec<Recorded> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded invocations.
    pub fn count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Forget all recorded invocations.
    pub fn clear(&self) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Default for RecordingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for RecordingHandler {
    fn invoke(&self, invocation: &Invocation<'_>) -> Result<Resolution, Exception> {
        let recorded = Recorded {
            method: invocation.method().map(str::to_string),
            path: invocation.request().map(|req| req.path().to_string()),
            params: invocation.params().clone(),
            exception: invocation.exception().map(|exc| exc.kind().name()),
        };
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(recorded);
        Ok(Resolution::Final(self.reply.clone()))
    }

    fn name(&self) -> &str {
        "RecordingHandler"
    }
}

// ============================================================================
// Counting Handler
// ============================================================================

/// A handler that counts invocations and replies with nothing.
///
/// # Example
///
/// ```rust
/// use trellis_core::{Handler, Invocation};
/// use trellis_std::testing::CountingHandler;
///
/// let counter = CountingHandler::new();
/// let counter_clone = counter.clone();
///
/// counter.invoke(&Invocation::empty()).unwrap();
///
/// assert_eq!(counter_clone.count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    /// Create a new counting handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl Handler for CountingHandler {
    fn invoke(&self, _invocation: &Invocation<'_>) -> Result<Resolution, Exception> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(Resolution::Final(Reply::Empty))
    }

    fn name(&self) -> &str {
        "CountingHandler"
    }
}

// ============================================================================
// Failing Handler
// ============================================================================

/// A handler that always raises an exception of a fixed kind.
#[derive(Debug, Clone)]
pub struct FailingHandler {
    kind: &'static ExceptionType,
    message: String,
}

impl FailingHandler {
    /// Raise `kind` with `message` on every invocation.
    pub fn new(kind: &'static ExceptionType, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl Handler for FailingHandler {
    fn invoke(&self, _invocation: &Invocation<'_>) -> Result<Resolution, Exception> {
        Err(Exception::new(self.kind, self.message.clone()))
    }

    fn name(&self) -> &str {
        "FailingHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::exception::INVALID_REQUEST;

    #[test]
    fn test_recording_handler_captures_invocation() {
        let recorder = RecordingHandler::new();
        let request = TestRequest::get("/a/1").build();
        let params: PathParams = [("id", "1")].into_iter().collect();
        recorder.invoke(&Invocation::for_route(&request, &params)).unwrap();

        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method.as_deref(), Some("GET"));
        assert_eq!(calls[0].path.as_deref(), Some("/a/1"));
        assert_eq!(calls[0].params.get("id"), Some("1"));
        assert_eq!(calls[0].exception, None);

        recorder.clear();
        assert_eq!(recorder.count(), 0);
    }

    #[test]
    fn test_counting_handler_reset() {
        let counter = CountingHandler::new();
        counter.invoke(&Invocation::empty()).unwrap();
        counter.invoke(&Invocation::empty()).unwrap();
        assert_eq!(counter.count(), 2);
        counter.reset();
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_failing_handler() {
        let err = FailingHandler::new(&INVALID_REQUEST, "nope")
            .invoke(&Invocation::empty())
            .unwrap_err();
        assert!(err.is_a(&INVALID_REQUEST));
        assert_eq!(err.message(), "nope");
    }

    #[test]
    #[should_panic(expected = "invalid test request")]
    fn test_invalid_test_request_panics() {
        TestRequest::get("no-leading-slash").build();
    }
}
