//! Run configuration
//!
//! Defaults, optionally overridden by a TOML file such as:
//!
//! ```toml
//! entry = "main"
//! recursion_limit = 250
//! ```

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interp::{DEFAULT_ENTRY, DEFAULT_RECURSION_LIMIT, MAX_RECURSION_LIMIT};

/// Configuration for one program run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Function invoked with no arguments
    pub entry: String,
    /// Call depth budget handed to the entry function
    pub recursion_limit: i64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            entry: DEFAULT_ENTRY.to_string(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl RunConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(ConfigError::Toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the interpreter would refuse anyway
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recursion_limit > MAX_RECURSION_LIMIT {
            return Err(ConfigError::RecursionLimitTooLarge {
                requested: self.recursion_limit,
                max: MAX_RECURSION_LIMIT,
            });
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config `{path}`")]
    #[diagnostic(code(config::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config")]
    #[diagnostic(code(config::toml))]
    Toml(#[source] toml::de::Error),

    #[error("recursion_limit {requested} exceeds the maximum of {max}")]
    #[diagnostic(code(config::recursion_limit_too_large))]
    RecursionLimitTooLarge { requested: i64, max: i64 },
}
