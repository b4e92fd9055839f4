//! Engine configuration
//!
//! Loaded from TOML; every field is optional and falls back to its default.
//!
//! ```toml
//! parameter_target = "source"
//! parallel = true
//! plan_cache_capacity = 10000
//! escalate_missing_source = true
//! conventional_aliases = ["s", "src", "x"]
//! ```

use fieldmap_rewrite::{ParameterRewriter, CONVENTIONAL_ALIASES, DEFAULT_TARGET};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Not valid TOML, or wrong field types
    #[error("invalid engine config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed but semantically invalid
    #[error("invalid engine config: {0}")]
    Invalid(String),
}

/// Options shared by every plan compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Name bound expression parameters are renamed to
    pub parameter_target: String,

    /// Resolve mapping keys in parallel
    pub parallel: bool,

    /// Maximum number of cached plans (0 disables caching)
    pub plan_cache_capacity: u64,

    /// Report a missing source on a non-defaultable field as an error
    pub escalate_missing_source: bool,

    /// Names preferred when inferring an expression's parameter
    pub conventional_aliases: Vec<String>,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With parameter target name
    #[inline]
    #[must_use]
    pub fn with_parameter_target(mut self, target: impl Into<String>) -> Self {
        self.parameter_target = target.into();
        self
    }

    /// With parallel resolution on or off
    #[inline]
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// With plan cache capacity
    #[inline]
    #[must_use]
    pub fn with_plan_cache_capacity(mut self, capacity: u64) -> Self {
        self.plan_cache_capacity = capacity;
        self
    }

    /// With missing-source escalation on or off
    #[inline]
    #[must_use]
    pub fn with_escalate_missing_source(mut self, escalate: bool) -> Self {
        self.escalate_missing_source = escalate;
        self
    }

    /// With conventional aliases
    #[must_use]
    pub fn with_conventional_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conventional_aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns error on malformed TOML or an invalid parameter target
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading engine config");
        Self::from_toml_str(&text)
    }

    /// Check semantic constraints
    ///
    /// # Errors
    /// Returns error if the parameter target is not an identifier
    pub fn validate(&self) -> Result<(), ConfigError> {
        let target = &self.parameter_target;
        let mut chars = target.chars();
        let valid = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "parameter_target `{target}` is not an identifier"
            )))
        }
    }

    /// Rewriter configured by these options
    #[must_use]
    pub fn rewriter(&self) -> ParameterRewriter {
        ParameterRewriter::new(self.parameter_target.clone())
            .with_aliases(self.conventional_aliases.iter().cloned())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parameter_target: DEFAULT_TARGET.to_string(),
            parallel: true,
            plan_cache_capacity: 10_000,
            escalate_missing_source: true,
            conventional_aliases: CONVENTIONAL_ALIASES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}
