//! Application settings.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```rust
//! use trellis::{AbsentAccept, AppConfig};
//!
//! let config = AppConfig::from_toml_str(
//!     r#"
//!     max_resolution_depth = 10
//!     absent_accept = "accept_any"
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.max_resolution_depth, 10);
//! assert_eq!(config.absent_accept, AbsentAccept::AcceptAny);
//! assert!(config.escape_literals);
//! ```

use serde::Deserialize;
use trellis_core::ConfigurationError;
use trellis_std::{
    dispatch::{DEFAULT_MAX_RESOLUTION_DEPTH, Resolver},
    output::{AbsentAccept, Negotiator},
    routing::PathCompiler,
};

fn default_max_resolution_depth() -> usize {
    DEFAULT_MAX_RESOLUTION_DEPTH
}

fn default_escape_literals() -> bool {
    true
}

/// Settings for an [`App`](crate::App).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Handler calls allowed while resolving one reply.
    #[serde(default = "default_max_resolution_depth")]
    pub max_resolution_depth: usize,

    /// Reject routes whose handler declares parameters that differ from the
    /// template's placeholders.
    #[serde(default)]
    pub strict_arity: bool,

    /// Escape literal template text. Turning this off lets regex
    /// metacharacters in templates act as regex syntax.
    #[serde(default = "default_escape_literals")]
    pub escape_literals: bool,

    /// Negotiation policy for requests without an `Accept` header.
    #[serde(default)]
    pub absent_accept: AbsentAccept,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
            strict_arity: false,
            escape_literals: true,
            absent_accept: AbsentAccept::Reject,
        }
    }
}

impl AppConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigurationError> {
        let config: Self =
            toml::from_str(text).map_err(|err| ConfigurationError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every setting is in range.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigurationError::InvalidConfig(
                "max_resolution_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the resolution depth limit.
    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    /// Enable or disable strict arity checks.
    pub fn with_strict_arity(mut self, strict: bool) -> Self {
        self.strict_arity = strict;
        self
    }

    /// Enable or disable literal escaping in templates.
    pub fn with_escape_literals(mut self, escape: bool) -> Self {
        self.escape_literals = escape;
        self
    }

    /// Set the policy for requests without an `Accept` header.
    pub fn with_absent_accept(mut self, policy: AbsentAccept) -> Self {
        self.absent_accept = policy;
        self
    }

    pub(crate) fn resolver(&self) -> Resolver {
        Resolver::new(self.max_resolution_depth)
    }

    pub(crate) fn negotiator(&self) -> Negotiator {
        Negotiator::new(self.absent_accept)
    }

    pub(crate) fn compiler(&self) -> PathCompiler {
        PathCompiler::new().escape_literals(self.escape_literals)
    }
}
