//! # Path Pattern Compiler
//!
//! Turns a path template such as `/user/{id!d}/posts/{slug!slug}` into an
//! anchored, case-insensitive regular expression with one named group per
//! placeholder.
//!
//! A placeholder is `{name}` or `{name!kind}`. Without a kind it captures any
//! non-empty text (`s`). The built-in kinds are listed on [`PlaceholderKind`];
//! further kinds can be added per compiler with [`PathCompiler::with_kind`].
//!
//! The template is tokenized into literal and placeholder spans, and literal
//! spans are regex-escaped. [`PathCompiler::raw_literals`] inserts literal
//! text unescaped instead, so `.` in `/file.json` matches any character.

use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use std::fmt;
use trellis_core::{ConfigurationError, PathParams};

/// The built-in placeholder kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    /// `d`: one or more digits.
    Integer,
    /// `year`: four digits, not starting with zero.
    Year,
    /// `month`: `01` to `12`.
    Month,
    /// `day`: `01` to `31`, without month-length awareness.
    Day,
    /// `f`: digits, a dot, digits.
    Decimal,
    /// `x`: lowercase hex digits.
    Hex,
    /// `slug`: lowercase letters, digits, `-` and `_`.
    Slug,
    /// `uuid`: hyphenated 8-4-4-4-12 hex, or 32 bare hex digits.
    Uuid,
    /// `s`: anything non-empty. The default.
    Segment,
}

impl PlaceholderKind {
    /// Every built-in kind.
    pub const ALL: [PlaceholderKind; 9] = [
        PlaceholderKind::Integer,
        PlaceholderKind::Year,
        PlaceholderKind::Month,
        PlaceholderKind::Day,
        PlaceholderKind::Decimal,
        PlaceholderKind::Hex,
        PlaceholderKind::Slug,
        PlaceholderKind::Uuid,
        PlaceholderKind::Segment,
    ];

    /// Look up a kind by its `!suffix`.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.suffix() == suffix)
    }

    /// The suffix written after `!` in a template.
    pub const fn suffix(self) -> &'static str {
        match self {
            PlaceholderKind::Integer => "d",
            PlaceholderKind::Year => "year",
            PlaceholderKind::Month => "month",
            PlaceholderKind::Day => "day",
            PlaceholderKind::Decimal => "f",
            PlaceholderKind::Hex => "x",
            PlaceholderKind::Slug => "slug",
            PlaceholderKind::Uuid => "uuid",
            PlaceholderKind::Segment => "s",
        }
    }

    /// The regex fragment placed inside the named group.
    pub const fn fragment(self) -> &'static str {
        match self {
            PlaceholderKind::Integer => "[0-9]+?",
            PlaceholderKind::Year => "[1-9][0-9]{3}",
            PlaceholderKind::Month => "(?:0[1-9]|1[0-2])",
            PlaceholderKind::Day => "(?:0[1-9]|[12][0-9]|3[01])",
            PlaceholderKind::Decimal => r"[0-9]+\.[0-9]+?",
            PlaceholderKind::Hex => "[0-9a-f]+?",
            PlaceholderKind::Slug => "[a-z0-9_-]+?",
            PlaceholderKind::Uuid => {
                "(?:[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}|[0-9a-f]{32})"
            }
            PlaceholderKind::Segment => ".+?",
        }
    }
}

/// A span of a tokenized template.
#[derive(Debug, PartialEq, Eq)]
enum Token<'t> {
    Literal(&'t str),
    Placeholder { name: &'t str, kind: Option<&'t str> },
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn tokenize(template: &str) -> Result<Vec<Token<'_>>, ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidTemplate {
        template: template.to_string(),
        reason,
    };

    let mut tokens = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        if open > 0 {
            tokens.push(Token::Literal(&rest[..open]));
        }
        let after = &rest[open + 1..];
        let offset = template.len() - rest.len() + open;
        let close = after
            .find('}')
            .ok_or_else(|| invalid(format!("unclosed `{{` at byte {offset}")))?;
        let body = &after[..close];
        if body.contains('{') {
            return Err(invalid(format!("nested `{{` in placeholder `{body}`")));
        }
        let (name, kind) = match body.split_once('!') {
            Some((name, kind)) => (name, Some(kind)),
            None => (body, None),
        };
        if !is_valid_name(name) {
            return Err(invalid(format!("invalid placeholder name `{name}`")));
        }
        tokens.push(Token::Placeholder { name, kind });
        rest = &after[close + 1..];
    }
    if !rest.is_empty() {
        tokens.push(Token::Literal(rest));
    }
    Ok(tokens)
}

/// Compiles path templates into [`CompiledPattern`]s.
#[derive(Debug, Clone)]
pub struct PathCompiler {
    custom: BTreeMap<String, String>,
    escape_literals: bool,
}

impl Default for PathCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl PathCompiler {
    /// A compiler with the built-in kinds that escapes literal text.
    pub fn new() -> Self {
        Self {
            custom: BTreeMap::new(),
            escape_literals: true,
        }
    }

    /// Register an extra kind. Custom kinds shadow built-ins of the same name.
    pub fn with_kind(mut self, suffix: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.custom.insert(suffix.into(), fragment.into());
        self
    }

    /// Insert literal text into the pattern unescaped.
    pub fn raw_literals(mut self) -> Self {
        self.escape_literals = false;
        self
    }

    /// Set whether literal text is escaped.
    pub fn escape_literals(mut self, escape: bool) -> Self {
        self.escape_literals = escape;
        self
    }

    fn fragment<'a>(
        &'a self,
        template: &str,
        suffix: Option<&str>,
    ) -> Result<&'a str, ConfigurationError> {
        let Some(suffix) = suffix else {
            return Ok(PlaceholderKind::Segment.fragment());
        };
        if let Some(fragment) = self.custom.get(suffix) {
            return Ok(fragment.as_str());
        }
        PlaceholderKind::from_suffix(suffix)
            .map(PlaceholderKind::fragment)
            .ok_or_else(|| ConfigurationError::UnknownPlaceholderKind {
                template: template.to_string(),
                kind: suffix.to_string(),
            })
    }

    /// Compile `template`.
    pub fn compile(&self, template: &str) -> Result<CompiledPattern, ConfigurationError> {
        let mut body = String::with_capacity(template.len() * 2);
        let mut placeholders: Vec<String> = Vec::new();

        for token in tokenize(template)? {
            match token {
                Token::Literal(text) if self.escape_literals => body.push_str(&regex::escape(text)),
                Token::Literal(text) => body.push_str(text),
                Token::Placeholder { name, kind } => {
                    if placeholders.iter().any(|seen| seen == name) {
                        return Err(ConfigurationError::InvalidTemplate {
                            template: template.to_string(),
                            reason: format!("placeholder `{name}` appears more than once"),
                        });
                    }
                    let fragment = self.fragment(template, kind)?;
                    body.push_str("(?P<");
                    body.push_str(name);
                    body.push('>');
                    body.push_str(fragment);
                    body.push(')');
                    placeholders.push(name.to_string());
                }
            }
        }

        if !body.starts_with('/') {
            body.insert(0, '/');
        }
        let pattern = format!("^{body}$");

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|err| ConfigurationError::InvalidTemplate {
                template: template.to_string(),
                reason: err.to_string(),
            })?;

        Ok(CompiledPattern {
            raw: template.to_string(),
            pattern,
            regex,
            placeholders,
        })
    }
}

/// A compiled path template.
#[derive(Clone)]
pub struct CompiledPattern {
    raw: String,
    pattern: String,
    regex: Regex,
    placeholders: Vec<String>,
}

impl CompiledPattern {
    /// The template as registered.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The anchored regex source.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Placeholder names in template order.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Returns true when the whole path matches.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match the whole path and collect the named groups.
    pub fn captures(&self, path: &str) -> Option<PathParams> {
        let caps = self.regex.captures(path)?;
        Some(
            self.placeholders
                .iter()
                .filter_map(|name| caps.name(name).map(|m| (name.as_str(), m.as_str())))
                .collect(),
        )
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("raw", &self.raw)
            .field("regex", &self.pattern)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(template: &str) -> CompiledPattern {
        PathCompiler::new().compile(template).unwrap()
    }

    #[test]
    fn test_plain_template() {
        let pattern = compile("a/b/c");
        assert_eq!(pattern.raw(), "a/b/c");
        assert_eq!(pattern.as_str(), "^/a/b/c$");
        assert!(pattern.is_match("/a/b/c"));
        assert!(!pattern.is_match("/a/b/d"));
        assert!(!pattern.is_match("/a/b/c/d"));
        assert!(pattern.captures("/a/b/c").unwrap().is_empty());
    }

    #[test]
    fn test_complex_template() {
        let pattern = compile("{hex!s}/{id!s}/{uuid!uuid}/{num!d}/{decimal!f}/{username!slug}");
        let expected = concat!(
            "^/(?P<hex>.+?)/(?P<id>.+?)/",
            "(?P<uuid>(?:[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}|[0-9a-f]{32}))/",
            r"(?P<num>[0-9]+?)/(?P<decimal>[0-9]+\.[0-9]+?)/(?P<username>[a-z0-9_-]+?)$"
        );
        assert_eq!(pattern.as_str(), expected);

        let params = pattern
            .captures("/af/???/8bbd4c5b-a040-43d1-8b99-8a19e9b29feb/4/4.2/hello_world-")
            .unwrap();
        assert_eq!(params.get("hex"), Some("af"));
        assert_eq!(params.get("id"), Some("???"));
        assert_eq!(params.get("num"), Some("4"));
        assert_eq!(params.get("decimal"), Some("4.2"));
        assert_eq!(params.get("username"), Some("hello_world-"));
        assert_eq!(
            pattern.placeholders(),
            &["hex", "id", "uuid", "num", "decimal", "username"]
        );
    }

    #[test]
    fn test_date_kinds() {
        let pattern = compile("year/{yyyy!year}/month/{mm!month}/day/{dd!day}");
        assert!(pattern.is_match("/year/2000/month/01/day/02"));
        assert!(pattern.is_match("/year/1000/month/12/day/15"));
        assert!(pattern.is_match("/year/9999/month/02/day/31"));
        assert!(!pattern.is_match("/year/999/month/12/day/15"));
        assert!(!pattern.is_match("/year/0999/month/12/day/15"));
        assert!(!pattern.is_match("/year/1999/month/13/day/01"));
        assert!(!pattern.is_match("/year/1999/month/00/day/01"));
        assert!(!pattern.is_match("/year/1999/month/12/day/32"));
        assert!(!pattern.is_match("/year/1999/month/12/day/00"));
    }

    #[test]
    fn test_integer_rejects_non_digits() {
        let pattern = compile("/{n!d}/");
        assert!(pattern.is_match("/14/"));
        assert!(pattern.is_match("/0/"));
        assert!(!pattern.is_match("/1a/"));
        assert!(!pattern.is_match("/abc/"));
        assert!(!pattern.is_match("//"));
    }

    #[test]
    fn test_case_insensitive() {
        let pattern = compile("/Users/{id!x}");
        assert!(pattern.is_match("/users/ABCDEF"));
        assert_eq!(pattern.captures("/USERS/ff").unwrap().get("id"), Some("ff"));
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        let err = PathCompiler::new().compile("/{a!zz}").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownPlaceholderKind {
                template: "/{a!zz}".to_string(),
                kind: "zz".to_string(),
            }
        );
    }

    #[test]
    fn test_malformed_templates() {
        let compiler = PathCompiler::new();
        for template in ["/{a", "/{}", "/{1a}", "/{a!d}/{a}", "/{a{b}}"] {
            assert!(
                matches!(
                    compiler.compile(template),
                    Err(ConfigurationError::InvalidTemplate { .. })
                ),
                "{template} should be rejected"
            );
        }
    }

    #[test]
    fn test_literal_escaping() {
        let escaped = compile("/feed.json");
        assert!(escaped.is_match("/feed.json"));
        assert!(!escaped.is_match("/feedxjson"));

        let raw = PathCompiler::new().raw_literals().compile("/feed.json").unwrap();
        assert_eq!(raw.as_str(), "^/feed.json$");
        assert!(raw.is_match("/feedxjson"));
    }

    #[test]
    fn test_custom_kind() {
        let compiler = PathCompiler::new().with_kind("lang", "(?:en|fr|de)");
        let pattern = compiler.compile("/{lang!lang}/about").unwrap();
        assert!(pattern.is_match("/fr/about"));
        assert!(!pattern.is_match("/es/about"));
    }

    #[test]
    fn test_suffix_lookup() {
        for kind in PlaceholderKind::ALL {
            assert_eq!(PlaceholderKind::from_suffix(kind.suffix()), Some(kind));
        }
        assert_eq!(PlaceholderKind::from_suffix("zz"), None);
    }
}
