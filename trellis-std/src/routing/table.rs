//! Ordered path routing.

use super::{
    Routed,
    pattern::{CompiledPattern, PathCompiler},
};
use crate::{dispatch::Resolver, output::Output};
use std::{collections::HashSet, fmt};
use trellis_core::{
    BoxHandler, ConfigurationError, DispatchError, Exception, Handler, HandlerExt, Invocation,
    PathParams, Request,
};

/// A path pattern bound to a handler and the outputs it accepts.
pub struct Route {
    pattern: CompiledPattern,
    handler: BoxHandler,
    outputs: Vec<Output>,
}

impl Route {
    /// The compiled pattern.
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// The handler.
    pub fn handler(&self) -> &BoxHandler {
        &self.handler
    }

    /// Outputs this route accepts. Empty means "use the application defaults".
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("handler", &self.handler.name())
            .finish()
    }
}

/// A route that matched a path, with the captured parameters.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    /// The matching route.
    pub route: &'a Route,
    /// Named groups captured from the path.
    pub params: PathParams,
}

impl<'a> RouteMatch<'a> {
    /// Bind the captured parameters and resolve the route's handler.
    pub fn resolve(&self, request: &Request, resolver: &Resolver) -> Result<Routed<'a>, Exception> {
        let invocation = Invocation::for_route(request, &self.params);
        let reply = resolver.resolve(self.route.handler.as_ref(), &invocation)?;
        Ok(Routed {
            reply,
            outputs: &self.route.outputs,
        })
    }
}

/// Routes tried in registration order; the first full match wins.
///
/// # Example
///
/// ```rust
/// use trellis_core::{Invocation, handler_fn};
/// use trellis_std::routing::RouteTable;
///
/// let mut routes = RouteTable::new();
/// routes
///     .register("/hello/{name}", handler_fn(|inv: &Invocation<'_>| {
///         format!("hello {}", inv.param("name").unwrap_or_default())
///     }), [])
///     .unwrap();
///
/// assert!(routes.contains("/hello/world"));
/// assert!(!routes.contains("/hello/"));
/// ```
pub struct RouteTable {
    routes: Vec<Route>,
    seen: HashSet<String>,
    compiler: PathCompiler,
    strict_arity: bool,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTable {
    /// An empty table using the default [`PathCompiler`].
    pub fn new() -> Self {
        Self::with_compiler(PathCompiler::new())
    }

    /// An empty table compiling templates with `compiler`.
    pub fn with_compiler(compiler: PathCompiler) -> Self {
        Self {
            routes: Vec::new(),
            seen: HashSet::new(),
            compiler,
            strict_arity: false,
        }
    }

    /// Check declared handler parameters against template placeholders.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_arity = strict;
        self
    }

    /// Compile `template` and append a route for it.
    pub fn register<H, O>(
        &mut self,
        template: &str,
        handler: H,
        outputs: O,
    ) -> Result<&mut Self, ConfigurationError>
    where
        H: Handler,
        O: IntoIterator<Item = Output>,
    {
        self.register_boxed(template, handler.boxed(), outputs)
    }

    /// Append a route for an already type-erased handler.
    pub fn register_boxed<O>(
        &mut self,
        template: &str,
        handler: BoxHandler,
        outputs: O,
    ) -> Result<&mut Self, ConfigurationError>
    where
        O: IntoIterator<Item = Output>,
    {
        let pattern = self.compiler.compile(template)?;

        if self.seen.contains(template) {
            return Err(ConfigurationError::DuplicateRoute {
                template: template.to_string(),
            });
        }

        if self.strict_arity
            && let Some(declared) = handler.declared_params()
        {
            let mut expected = pattern.placeholders().to_vec();
            let mut declared = declared.to_vec();
            expected.sort();
            declared.sort();
            if expected != declared {
                return Err(ConfigurationError::ArityMismatch {
                    template: template.to_string(),
                    expected,
                    declared,
                });
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(template, regex = pattern.as_str(), handler = handler.name(), "route registered");

        self.seen.insert(template.to_string());
        self.routes.push(Route {
            pattern,
            handler,
            outputs: outputs.into_iter().collect(),
        });
        Ok(self)
    }

    /// The first route whose pattern matches the whole path.
    pub fn find(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.iter().find_map(|route| {
            route
                .pattern
                .captures(path)
                .map(|params| RouteMatch { route, params })
        })
    }

    /// Returns true when any route matches `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.routes.iter().any(|route| route.pattern.is_match(path))
    }

    /// The error raised when nothing matches `path`.
    pub fn no_route(&self, path: &str) -> DispatchError {
        DispatchError::NoRoute {
            path: path.to_string(),
            routes: self.templates(),
        }
    }

    /// Find the route for `request` and resolve its handler.
    pub fn dispatch<'a>(
        &'a self,
        request: &Request,
        resolver: &Resolver,
    ) -> Result<Routed<'a>, Exception> {
        self.find(request.path())
            .ok_or_else(|| self.no_route(request.path()))?
            .resolve(request, resolver)
    }

    /// Every registered raw template, sorted.
    pub fn templates(&self) -> Vec<String> {
        let mut templates: Vec<String> = self.seen.iter().cloned().collect();
        templates.sort();
        templates
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true when no route is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SHOWN: usize = 3;
        let mut out = f.debug_struct("RouteTable");
        out.field("routes", &&self.routes[..self.routes.len().min(SHOWN)]);
        if self.routes.len() > SHOWN {
            out.field("remaining", &(self.routes.len() - SHOWN));
        }
        out.finish()
    }
}
