use crate::{config::ConfigError, descriptor::Builtin};
use thiserror::Error as ThisError;

///
/// SynthError
///
/// Every synthesis failure is fatal for the batch being synthesized: a
/// malformed descriptor never produces a partial wrapper.
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum SynthError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("duplicate endpoint {service}.{name}")]
    DuplicateEndpoint { service: String, name: String },

    #[error("duplicate path parameter '{param}' in {endpoint}")]
    DuplicatePathParam { endpoint: String, param: String },

    #[error("emit failed for {endpoint}: {reason}")]
    Emit { endpoint: String, reason: String },

    #[error("invalid {field} '{value}' in {endpoint}: {reason}")]
    InvalidDescriptor {
        endpoint: String,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("unsupported builtin type '{builtin}' for path parameter")]
    UnsupportedBuiltin { builtin: Builtin },
}

impl SynthError {
    pub(crate) fn invalid(
        endpoint: impl Into<String>,
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidDescriptor {
            endpoint: endpoint.into(),
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }
}
