//! JSON output.

use super::{Output, Renderer};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use trellis_core::{Body, Context, DispatchError, Request};

/// Media types the JSON output answers to.
pub const JSON_MEDIA_TYPES: [&str; 2] = ["application/json", "application/javascript"];

/// Serializes the context as indented JSON, keys in insertion order.
///
/// A context that cannot be serialized yields no body rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonRenderer {
    indent: Vec<u8>,
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRenderer {
    /// A renderer indenting with four spaces.
    pub fn new() -> Self {
        Self::with_indent(4)
    }

    /// A renderer indenting with `spaces` spaces.
    pub fn with_indent(spaces: usize) -> Self {
        Self {
            indent: vec![b' '; spaces],
        }
    }

    /// Serialize `context` to bytes.
    pub fn to_vec(&self, context: &Context) -> Result<Vec<u8>, serde_json::Error> {
        let mut out = Vec::with_capacity(128);
        let formatter = PrettyFormatter::with_indent(&self.indent);
        let mut serializer = Serializer::with_formatter(&mut out, formatter);
        context.serialize(&mut serializer)?;
        Ok(out)
    }
}

impl Renderer for JsonRenderer {
    fn render(
        &self,
        _request: Option<&Request>,
        context: &Context,
    ) -> Result<Option<Body>, DispatchError> {
        match self.to_vec(context) {
            Ok(bytes) => Ok(Some(Body::Bytes(bytes))),
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %err, "context could not be serialized as JSON; sending no body");
                #[cfg(not(feature = "tracing"))]
                let _ = err;
                Ok(None)
            }
        }
    }
}

/// The JSON output.
pub fn json() -> Output {
    Output::new("json", JSON_MEDIA_TYPES, JsonRenderer::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(value: serde_json::Value) -> Context {
        match value {
            serde_json::Value::Object(map) => map,
            _ => Context::new(),
        }
    }

    #[test]
    fn test_json_indent_and_order() {
        let ctx = context(json!({"test": 1, "output": 2}));
        let body = json().render(None, &ctx).unwrap().unwrap();
        assert_eq!(body.as_text(), Some("{\n    \"test\": 1,\n    \"output\": 2\n}"));
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut ctx = Context::new();
        ctx.insert("zebra".to_string(), 1.into());
        ctx.insert("apple".to_string(), json!([1, 2]));
        let text = String::from_utf8(JsonRenderer::new().to_vec(&ctx).unwrap()).unwrap();
        assert!(text.find("zebra").unwrap() < text.find("apple").unwrap());
    }

    #[test]
    fn test_custom_indent() {
        let ctx = context(json!({"a": {"b": true}}));
        let text = String::from_utf8(JsonRenderer::with_indent(2).to_vec(&ctx).unwrap()).unwrap();
        assert_eq!(text, "{\n  \"a\": {\n    \"b\": true\n  }\n}");
    }

    #[test]
    fn test_media_types() {
        let output = json();
        assert!(output.responds_to("application/json"));
        assert!(output.responds_to("application/javascript"));
        assert!(!output.responds_to("text/html"));
    }

    #[test]
    fn test_empty_context() {
        let body = json().render(None, &Context::new()).unwrap().unwrap();
        assert_eq!(body.as_text(), Some("{}"));
    }
}
