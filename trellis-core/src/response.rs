//! Response bodies and the response descriptor handed back to the host.

/// A rendered response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    /// No body.
    #[default]
    Empty,
    /// A text body.
    Text(String),
    /// A binary body.
    Bytes(Vec<u8>),
}

impl Body {
    /// The body as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Empty => &[],
            Body::Text(text) => text.as_bytes(),
            Body::Bytes(bytes) => bytes,
        }
    }

    /// The body as UTF-8 text, if it is valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Empty => Some(""),
            Body::Text(text) => Some(text),
            Body::Bytes(bytes) => std::str::from_utf8(bytes).ok(),
        }
    }

    /// Returns true when the body has no bytes.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Consume the body into bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Body::Empty => Vec::new(),
            Body::Text(text) => text.into_bytes(),
            Body::Bytes(bytes) => bytes,
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(bytes)
    }
}

/// What the dispatcher hands to the response transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// The rendered body, possibly empty.
    pub body: Body,
    /// The negotiated media type, when an output rendered the body.
    pub content_type: Option<String>,
}

impl Response {
    /// A response with `body` and no content type.
    pub fn new(body: impl Into<Body>) -> Self {
        Self {
            body: body.into(),
            content_type: None,
        }
    }

    /// A response with no body.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}
