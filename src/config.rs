//! Configuration for scanning and rendering
//!
//! Configuration can be built in code or loaded from a TOML file:
//!
//! ```toml
//! directive = "@@"
//! unresolved = "error"
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::substitution::UnresolvedPolicy;

/// Directive prefix used when nothing else is configured
pub const DEFAULT_DIRECTIVE: &str = "#";

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Options controlling extraction and rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Prefix introducing an annotation inside a host-language comment
    pub directive: String,
    /// What rendering does with placeholders missing from the substitution map
    pub unresolved: UnresolvedPolicy,
}

/// TOML structure for deserializing configuration
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    directive: Option<String>,
    unresolved: Option<UnresolvedPolicy>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            directive: DEFAULT_DIRECTIVE.to_string(),
            unresolved: UnresolvedPolicy::default(),
        }
    }
}

impl ExtractConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directive prefix
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = directive.into();
        self
    }

    /// Set the unresolved placeholder policy
    pub fn with_unresolved_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.unresolved = policy;
        self
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let defaults = Self::default();
        let config = ExtractConfig {
            directive: parsed.directive.unwrap_or(defaults.directive),
            unresolved: parsed.unresolved.unwrap_or(defaults.unresolved),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can be used for scanning
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_directive(&self.directive).map_err(ConfigError::Invalid)
    }
}

/// A directive prefix must be non-empty and free of whitespace
pub(crate) fn validate_directive(directive: &str) -> Result<(), String> {
    if directive.is_empty() {
        return Err("directive prefix must not be empty".to_string());
    }
    if directive.chars().any(char::is_whitespace) {
        return Err(format!(
            "directive prefix '{}' must not contain whitespace",
            directive
        ));
    }
    Ok(())
}
