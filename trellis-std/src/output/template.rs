//! Template output.
//!
//! The template source comes from the context itself: `template_file` names
//! a file to read, otherwise `template` holds the template text. With
//! neither key the output yields no body.
//!
//! Rendering is delegated to a [`TemplateEngine`]. An output built with
//! [`template()`] has none and fails every render with `RendererUnavailable`,
//! so a missing engine shows up on the first request that negotiates HTML.

use super::{Output, Renderer};
use std::{fmt, path::PathBuf, sync::Arc};
use thiserror::Error;
use trellis_core::{BoxError, Body, Context, DispatchError, Request};

/// Context key naming a template file.
pub const TEMPLATE_FILE_KEY: &str = "template_file";

/// Context key holding inline template text.
pub const TEMPLATE_KEY: &str = "template";

/// Renders template text against a context.
pub trait TemplateEngine: Send + Sync + 'static {
    /// Render `source` with the values in `context`.
    fn render(&self, source: &str, context: &Context) -> Result<String, BoxError>;
}

#[derive(Debug, Error)]
enum TemplateSourceError {
    #[error("context key `{key}` must be a string")]
    NotText { key: &'static str },

    #[error("failed to read template file `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Renders `text/html` through an optional [`TemplateEngine`].
#[derive(Clone, Default)]
pub struct TemplateRenderer {
    engine: Option<Arc<dyn TemplateEngine>>,
}

impl TemplateRenderer {
    /// A renderer with no engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// A renderer using `engine`.
    pub fn with_engine(engine: impl TemplateEngine) -> Self {
        Self {
            engine: Some(Arc::new(engine)),
        }
    }

    fn source(context: &Context) -> Result<Option<String>, TemplateSourceError> {
        if let Some(value) = context.get(TEMPLATE_FILE_KEY) {
            let path = value.as_str().ok_or(TemplateSourceError::NotText {
                key: TEMPLATE_FILE_KEY,
            })?;
            let path = PathBuf::from(path);
            return std::fs::read_to_string(&path)
                .map(Some)
                .map_err(|source| TemplateSourceError::Read { path, source });
        }
        match context.get(TEMPLATE_KEY) {
            Some(value) => value
                .as_str()
                .map(|text| Some(text.to_string()))
                .ok_or(TemplateSourceError::NotText { key: TEMPLATE_KEY }),
            None => Ok(None),
        }
    }
}

impl Renderer for TemplateRenderer {
    fn render(
        &self,
        _request: Option<&Request>,
        context: &Context,
    ) -> Result<Option<Body>, DispatchError> {
        let engine = self
            .engine
            .as_ref()
            .ok_or_else(|| DispatchError::RendererUnavailable {
                output: "template".to_string(),
                reason: "no template engine is configured".to_string(),
            })?;

        let failed = |source: BoxError| DispatchError::RenderFailed {
            output: "template".to_string(),
            source,
        };

        let Some(source) = Self::source(context).map_err(|err| failed(err.into()))? else {
            return Ok(None);
        };
        let text = engine.render(&source, context).map_err(failed)?;
        Ok(Some(Body::Text(text)))
    }
}

impl fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRenderer")
            .field("engine", &self.engine.is_some())
            .finish()
    }
}

/// The HTML template output without an engine.
pub fn template() -> Output {
    Output::new("template", ["text/html"], TemplateRenderer::new())
}

/// The HTML template output rendering through `engine`.
pub fn template_with(engine: impl TemplateEngine) -> Output {
    Output::new("template", ["text/html"], TemplateRenderer::with_engine(engine))
}
