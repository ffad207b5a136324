use super::Stage;
use crate::config::AppConfig;
use std::fmt;
use trellis_core::{
    ConfigurationError, DispatchError, Exception, ExceptionType, Handler, Reply, Request,
    RequestParts, Response,
};
use trellis_std::{
    dispatch::Resolver,
    output::{Negotiator, Output, json},
    routing::{ExceptionTable, RouteTable},
};

/// Where [`App::mount`] registers a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mount {
    /// A path template for the route table.
    Path(String),
    /// An exception kind for the exception table.
    Exception(&'static ExceptionType),
}

impl From<&str> for Mount {
    fn from(template: &str) -> Self {
        Mount::Path(template.to_string())
    }
}

impl From<String> for Mount {
    fn from(template: String) -> Self {
        Mount::Path(template)
    }
}

impl From<&'static ExceptionType> for Mount {
    fn from(kind: &'static ExceptionType) -> Self {
        Mount::Exception(kind)
    }
}

/// The dispatch orchestrator.
///
/// Owns both routing tables and the default outputs. Configure it through
/// `&mut self`, then share it read-only across requests.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use trellis::prelude::*;
///
/// let mut app = App::new();
/// app.add_route("/{n!d}/", |inv: &Invocation<'_>| {
///     inv.param_as::<i64>("n").map(|n| json!({ "yay": n }))
/// }, [trellis::output::json()])
/// .unwrap();
///
/// let response = app
///     .get_response(RequestParts::new("GET", "/14/").accept("application/json"))
///     .unwrap();
/// assert_eq!(response.body.as_text(), Some("{\n    \"yay\": 14\n}"));
/// ```
pub struct App {
    routes: RouteTable,
    exceptions: ExceptionTable,
    default_outputs: Vec<Output>,
    config: AppConfig,
    resolver: Resolver,
    negotiator: Negotiator,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// An app with the default configuration and JSON as the default output.
    pub fn new() -> Self {
        Self::build(AppConfig::default())
    }

    /// An app with `config`, validated first.
    pub fn with_config(config: AppConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: AppConfig) -> Self {
        Self {
            routes: RouteTable::with_compiler(config.compiler()).strict(config.strict_arity),
            exceptions: ExceptionTable::new(),
            default_outputs: vec![json()],
            resolver: config.resolver(),
            negotiator: config.negotiator(),
            config,
        }
    }

    /// Replace the outputs used by entries that declare none.
    pub fn with_default_outputs(mut self, outputs: impl IntoIterator<Item = Output>) -> Self {
        self.default_outputs = outputs.into_iter().collect();
        self
    }

    /// Register a route.
    pub fn add_route<H, O>(
        &mut self,
        template: &str,
        handler: H,
        outputs: O,
    ) -> Result<&mut Self, ConfigurationError>
    where
        H: Handler,
        O: IntoIterator<Item = Output>,
    {
        self.routes.register(template, handler, outputs)?;
        Ok(self)
    }

    /// Register an exception handler.
    ///
    /// When the request itself could not be built, the handler sees no
    /// request, but its reply is still negotiated against the raw `Accept`
    /// header from the [`RequestParts`].
    pub fn add_error_handler<H, O>(
        &mut self,
        kind: &'static ExceptionType,
        handler: H,
        outputs: O,
    ) -> Result<&mut Self, ConfigurationError>
    where
        H: Handler,
        O: IntoIterator<Item = Output>,
    {
        self.exceptions.register(kind, handler, outputs)?;
        Ok(self)
    }

    /// Register `handler` on a path template or an exception kind.
    pub fn mount<H, O>(
        &mut self,
        target: impl Into<Mount>,
        handler: H,
        outputs: O,
    ) -> Result<&mut Self, ConfigurationError>
    where
        H: Handler,
        O: IntoIterator<Item = Output>,
    {
        match target.into() {
            Mount::Path(template) => self.add_route(&template, handler, outputs),
            Mount::Exception(kind) => self.add_error_handler(kind, handler, outputs),
        }
    }

    /// The route table.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// The exception table.
    pub fn exceptions(&self) -> &ExceptionTable {
        &self.exceptions
    }

    /// Outputs used by entries that declare none.
    pub fn default_outputs(&self) -> &[Output] {
        &self.default_outputs
    }

    /// The configuration the app was built with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Build a request from `parts` and dispatch it.
    ///
    /// Any failure is routed once through the exception table. When that
    /// finds no handler, or its handler or output fails, the error is
    /// returned.
    pub fn get_response(&self, parts: RequestParts) -> Result<Response, DispatchError> {
        #[cfg(feature = "tracing")]
        let _span =
            tracing::info_span!("dispatch", method = %parts.method, path = %parts.path).entered();

        let accept = parts.accept.clone();
        match Request::from_parts(parts) {
            Ok(request) => self.respond(&request),
            Err(exception) => {
                self.recover(Stage::RequestBuilding, exception, None, accept.as_deref())
            }
        }
    }

    /// Dispatch an already built request.
    pub fn handle(&self, request: &Request) -> Result<Response, DispatchError> {
        #[cfg(feature = "tracing")]
        let _span =
            tracing::info_span!("dispatch", method = request.method(), path = request.path())
                .entered();
        self.respond(request)
    }

    fn respond(&self, request: &Request) -> Result<Response, DispatchError> {
        match self.run(request) {
            Ok(response) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    stage = %Stage::Responded,
                    bytes = response.body.as_bytes().len(),
                    "responded"
                );
                Ok(response)
            }
            Err((stage, exception)) => {
                self.recover(stage, exception, Some(request), request.accept())
            }
        }
    }

    fn run(&self, request: &Request) -> Result<Response, (Stage, Exception)> {
        let found = self.routes.find(request.path()).ok_or_else(|| {
            (
                Stage::RouteLookup,
                Exception::from(self.routes.no_route(request.path())),
            )
        })?;

        let routed = found
            .resolve(request, &self.resolver)
            .map_err(|exception| (Stage::HandlerExecution, exception))?;

        self.render(Some(request), request.accept(), routed.reply, routed.outputs)
            .map_err(|err| (Stage::Rendering, Exception::from(err)))
    }

    fn render(
        &self,
        request: Option<&Request>,
        accept: Option<&str>,
        reply: Reply,
        outputs: &[Output],
    ) -> Result<Response, DispatchError> {
        let context = match reply {
            Reply::Context(context) => context,
            Reply::Body(body) => return Ok(Response::new(body)),
            Reply::Empty => return Ok(Response::empty()),
        };

        let outputs = if outputs.is_empty() {
            self.default_outputs.as_slice()
        } else {
            outputs
        };
        let selected = self
            .negotiator
            .select(accept, outputs)?;

        Ok(match selected.output.render(request, &context)? {
            Some(body) => Response::new(body).with_content_type(selected.media_type),
            None => Response::empty(),
        })
    }

    fn recover(
        &self,
        stage: Stage,
        exception: Exception,
        request: Option<&Request>,
        accept: Option<&str>,
    ) -> Result<Response, DispatchError> {
        debug_assert!(stage.is_recoverable());
        #[cfg(feature = "tracing")]
        tracing::error!(%stage, kind = exception.kind().name(), error = %exception, "dispatch failed");

        let result = self
            .exceptions
            .dispatch(&exception, request, &self.resolver)
            .and_then(|routed| self.render(request, accept, routed.reply, routed.outputs));

        #[cfg(feature = "tracing")]
        if let Err(err) = &result {
            tracing::error!(stage = %Stage::ErrorDispatch, error = %err, "exception dispatch failed");
        }
        result
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("routes", &self.routes)
            .field("exceptions", &self.exceptions)
            .field("default_outputs", &self.default_outputs)
            .field("config", &self.config)
            .finish()
    }
}
