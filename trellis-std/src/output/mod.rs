//! # Outputs
//!
//! An [`Output`] pairs a set of media types with a [`Renderer`] that turns a
//! merged [`Context`] into a response body. Outputs are immutable and cheap
//! to clone, so the same one can be attached to many routes.
//!
//! - [`json()`]: `application/json`, 4-space indented, keys in insertion order
//! - [`template()`] / [`template_with()`]: `text/html` through a [`TemplateEngine`]
//! - [`Negotiator`]: picks an output from the request's `Accept` header

mod json;
mod negotiate;
mod template;

pub use json::{JSON_MEDIA_TYPES, JsonRenderer, json};
pub use negotiate::{AbsentAccept, Accept, MediaRange, Negotiator, Selected};
pub use template::{
    TEMPLATE_FILE_KEY, TEMPLATE_KEY, TemplateEngine, TemplateRenderer, template, template_with,
};

use std::{fmt, sync::Arc};
use trellis_core::{Body, Context, DispatchError, Request};

/// Turns a merged context into a body.
///
/// Returning `Ok(None)` means "no body"; the response is sent empty.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Renderer`",
    label = "missing `Renderer` implementation",
    note = "Closures can be wrapped with `Output::from_fn`."
)]
pub trait Renderer: Send + Sync + 'static {
    /// Render `context` for `request`.
    fn render(
        &self,
        request: Option<&Request>,
        context: &Context,
    ) -> Result<Option<Body>, DispatchError>;
}

struct FnRenderer<F>(F);

impl<F> Renderer for FnRenderer<F>
where
    F: Fn(Option<&Request>, &Context) -> Result<Option<Body>, DispatchError>
        + Send
        + Sync
        + 'static,
{
    fn render(
        &self,
        request: Option<&Request>,
        context: &Context,
    ) -> Result<Option<Body>, DispatchError> {
        (self.0)(request, context)
    }
}

/// A named renderer and the media types it produces.
#[derive(Clone)]
pub struct Output {
    name: Arc<str>,
    media_types: Arc<[String]>,
    renderer: Arc<dyn Renderer>,
}

impl Output {
    /// Create an output from a renderer.
    pub fn new<I, S>(name: &str, media_types: I, renderer: impl Renderer) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: Arc::from(name),
            media_types: media_types.into_iter().map(Into::into).collect(),
            renderer: Arc::new(renderer),
        }
    }

    /// Create an output from a rendering function.
    pub fn from_fn<I, S, F>(name: &str, media_types: I, render: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(Option<&Request>, &Context) -> Result<Option<Body>, DispatchError>
            + Send
            + Sync
            + 'static,
    {
        Self::new(name, media_types, FnRenderer(render))
    }

    /// The output's name, used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Media types in declaration order.
    pub fn media_types(&self) -> &[String] {
        &self.media_types
    }

    /// Returns true when this output declares `media_type`.
    pub fn responds_to(&self, media_type: &str) -> bool {
        self.media_types
            .iter()
            .any(|declared| declared.eq_ignore_ascii_case(media_type))
    }

    /// Render through this output's renderer.
    pub fn render(
        &self,
        request: Option<&Request>,
        context: &Context,
    ) -> Result<Option<Body>, DispatchError> {
        self.renderer.render(request, context)
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("name", &self.name)
            .field("media_types", &self.media_types)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Output {
        Output::from_fn("plain", ["text/plain"], |_req, ctx| {
            Ok(Some(Body::Text(format!("{} keys", ctx.len()))))
        })
    }

    #[test]
    fn test_from_fn_renders() {
        let mut ctx = Context::new();
        ctx.insert("a".to_string(), 1.into());
        let body = plain().render(None, &ctx).unwrap();
        assert_eq!(body, Some(Body::Text("1 keys".to_string())));
    }

    #[test]
    fn test_responds_to_ignores_case() {
        let output = plain();
        assert!(output.responds_to("TEXT/Plain"));
        assert!(!output.responds_to("text/html"));
        assert_eq!(output.name(), "plain");
    }

    #[test]
    fn test_clone_shares_renderer() {
        let output = plain();
        let copy = output.clone();
        assert!(Arc::ptr_eq(&output.renderer, &copy.renderer));
        assert_eq!(format!("{copy:?}"), r#"Output { name: "plain", media_types: ["text/plain"] }"#);
    }
}
