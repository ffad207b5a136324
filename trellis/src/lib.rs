//! # trellis - Request Dispatch Core
//!
//! `trellis` turns a parsed request into a response body:
//!
//! 1. the path is matched against ordered, compiled path templates,
//! 2. the matched handler chain is resolved to a reply,
//! 3. a mapping reply is rendered by the output the `Accept` header selects.
//!
//! Failures at any step are routed once through a table of exception
//! handlers keyed by an explicit exception hierarchy.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use trellis::prelude::*;
//!
//! static NOT_FOUND: ExceptionType = ExceptionType::root("NotFound");
//!
//! fn show(inv: &Invocation<'_>) -> Result<serde_json::Value, Exception> {
//!     match inv.param("name") {
//!         Some("ghost") => Err(Exception::new(&NOT_FOUND, "no such user")),
//!         name => Ok(json!({ "user": name })),
//!     }
//! }
//!
//! fn not_found(inv: &Invocation<'_>) -> String {
//!     format!("404: {}", inv.exception().map(Exception::message).unwrap_or_default())
//! }
//!
//! let mut app = App::new();
//! app.add_route("/users/{name!slug}", show, [trellis::output::json()]).unwrap();
//! app.add_error_handler(&NOT_FOUND, not_found, []).unwrap();
//!
//! let response = app
//!     .get_response(RequestParts::new("GET", "/users/ghost").accept("application/json"))
//!     .unwrap();
//! assert_eq!(response.body.as_text(), Some("404: no such user"));
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod config;
pub mod orchestrator;

pub use config::AppConfig;
pub use orchestrator::{App, Mount, Stage};

pub use trellis_core::{
    // Errors
    BoxError,
    ConfigurationError,
    // Context
    Context,
    DispatchError,
    Error,
    // Exceptions
    Exception,
    ExceptionType,
    // Handlers
    BoxHandler,
    Declared,
    Handler,
    HandlerExt,
    IntoResolution,
    Invocation,
    PathParams,
    Reply,
    // Request / Response
    Body,
    Request,
    RequestParts,
    Resolution,
    Response,
    handler_fn,
};

pub use trellis_std::output::AbsentAccept;

/// Built-in exception kinds.
pub mod exception {
    pub use trellis_core::exception::{
        ANY, CONFIGURATION_ERROR, DISPATCH_ERROR, INVALID_PARAMETER, INVALID_REQUEST,
        METHOD_NOT_ALLOWED, NO_OUTPUT_HANDLER, NO_ROUTE, RESOLUTION_DEPTH_EXCEEDED,
    };
}

/// Path routing and exception routing tables.
pub mod routing {
    pub use trellis_std::routing::{
        CompiledPattern, ExceptionRoute, ExceptionTable, PathCompiler, PlaceholderKind, Route,
        RouteMatch, RouteTable, Routed,
    };
}

/// Handler resolution, aggregation and method dispatch.
pub mod dispatch {
    pub use trellis_std::dispatch::{
        DEFAULT_MAX_RESOLUTION_DEPTH, MethodDispatch, Resolver, View, aggregate,
    };
}

/// Outputs and content negotiation.
pub mod output {
    pub use trellis_std::output::{
        AbsentAccept, Accept, JsonRenderer, MediaRange, Negotiator, Output, Renderer, Selected,
        TemplateEngine, TemplateRenderer, json, template, template_with,
    };
}

/// Testing utilities.
pub mod testing {
    pub use trellis_std::testing::{
        CountingHandler, FailingHandler, Recorded, RecordingHandler, TestRequest,
    };
}

/// Prelude module - common imports for Trellis.
///
/// # Usage
///
/// ```rust
/// use trellis::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        App, AppConfig, Body, ConfigurationError, Context, DispatchError, Exception,
        ExceptionType, Handler, HandlerExt, Invocation, Reply, RequestParts, Resolution, Response,
        dispatch::{MethodDispatch, View},
        handler_fn,
        output::Output,
    };
}
