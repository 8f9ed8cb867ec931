//! Synthesizer configuration.
//!
//! Loaded from TOML; every field has a default so an empty document is a
//! valid configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    /// TOML could not be parsed into the expected structure.
    #[error("toml error: {0}")]
    CannotParseToml(String),

    #[error(transparent)]
    ConfigSchema(#[from] ConfigSchemaError),
}

///
/// ConfigSchemaError
///

#[derive(Debug, ThisError)]
pub enum ConfigSchemaError {
    #[error("validation error: {0}")]
    ValidationError(String),
}

///
/// Validate
///

pub trait Validate {
    fn validate(&self) -> Result<(), ConfigSchemaError>;
}

///
/// Defaults
///

mod defaults {
    pub fn runtime_crate() -> String {
        "tether_core".to_string()
    }

    pub fn wrapper_prefix() -> String {
        "__encore".to_string()
    }

    pub const fn emit_docs() -> bool {
        true
    }
}

///
/// SynthConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SynthConfig {
    /// Crate path the emitted wrappers call into, without the leading `::`.
    #[serde(default = "defaults::runtime_crate")]
    pub runtime_crate: String,

    #[serde(default = "defaults::wrapper_prefix")]
    pub wrapper_prefix: String,

    #[serde(default = "defaults::emit_docs")]
    pub emit_docs: bool,
}

impl SynthConfig {
    pub fn from_toml(src: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(src).map_err(|e| ConfigError::CannotParseToml(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    /// Wrapper function name for one endpoint.
    #[must_use]
    pub fn wrapper_name(&self, service: &str, endpoint: &str) -> String {
        format!("{}_{service}_{endpoint}", self.wrapper_prefix)
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            runtime_crate: defaults::runtime_crate(),
            wrapper_prefix: defaults::wrapper_prefix(),
            emit_docs: defaults::emit_docs(),
        }
    }
}

impl Validate for SynthConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        if self.runtime_crate.is_empty()
            || !self.runtime_crate.split("::").all(is_ident_fragment)
        {
            return Err(ConfigSchemaError::ValidationError(format!(
                "runtime_crate '{}' is not a crate path",
                self.runtime_crate
            )));
        }

        if !is_ident_fragment(&self.wrapper_prefix) {
            return Err(ConfigSchemaError::ValidationError(format!(
                "wrapper_prefix '{}' is not an identifier",
                self.wrapper_prefix
            )));
        }

        Ok(())
    }
}

/// Non-empty ASCII identifier: letters, digits and `_`, not starting with a digit.
pub(crate) fn is_ident_fragment(s: &str) -> bool {
    let mut chars = s.chars();

    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
