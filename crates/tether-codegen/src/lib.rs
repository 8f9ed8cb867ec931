//! Call-lifecycle wrapper synthesis.
//!
//! Given [`EndpointDescriptor`]s produced by the analyzer, the
//! [`Synthesizer`] emits one wrapper function per endpoint that drives the
//! `tether-core` runtime through begin-call, begin-request, isolated handler
//! execution, finish-request and finish-call.
//!
//! The pipeline is strictly staged:
//!
//!   descriptor → validate → expand → emit
//!
//! Validation rejects malformed descriptors before any tokens exist, so
//! expansion never has to produce partial output.

pub mod config;
pub mod descriptor;
pub mod emit;
pub mod error;
pub mod template;

mod expand;
mod validate;

pub use config::SynthConfig;
pub use descriptor::{AccessLevel, Builtin, EndpointDescriptor, EndpointShape, PathSegment, TypeRef};
pub use emit::{EmitBackend, SourceBuffer};
pub use error::SynthError;
pub use expand::builtin_type;
pub use template::PathTemplate;

use crate::{config::Validate, expand::Expander};
use proc_macro2::TokenStream as TokenStream2;
use tracing::debug;

///
/// Synthesizer
///

#[derive(Clone, Debug, Default)]
pub struct Synthesizer {
    config: SynthConfig,
}

impl Synthesizer {
    pub fn new(config: SynthConfig) -> Result<Self, SynthError> {
        config
            .validate()
            .map_err(|err| SynthError::Config(err.into()))?;

        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Synthesize the wrapper for one endpoint.
    pub fn synthesize(&self, desc: &EndpointDescriptor) -> Result<TokenStream2, SynthError> {
        let validated = validate::validate(desc)?;
        let item = Expander::new(&self.config)?.expand(&validated)?;

        debug!(endpoint = %desc.label(), raw = desc.is_raw(), "synthesized wrapper");

        Ok(item)
    }

    /// Synthesize wrappers for a batch, in input order.
    pub fn wrappers(&self, descs: &[EndpointDescriptor]) -> Result<TokenStream2, SynthError> {
        validate::validate_batch(descs)?;

        let mut out = TokenStream2::new();
        for desc in descs {
            out.extend(self.synthesize(desc)?);
        }

        Ok(out)
    }

    /// Synthesize a batch and hand each wrapper to `backend`.
    ///
    /// Every descriptor is synthesized before anything is emitted, so a
    /// failing descriptor leaves the backend untouched.
    pub fn emit_all<B>(&self, descs: &[EndpointDescriptor], backend: &mut B) -> Result<(), SynthError>
    where
        B: EmitBackend + ?Sized,
    {
        validate::validate_batch(descs)?;

        let items = descs
            .iter()
            .map(|desc| self.synthesize(desc))
            .collect::<Result<Vec<_>, _>>()?;

        for (desc, item) in descs.iter().zip(items) {
            backend.emit(desc, item)?;
        }

        debug!(count = descs.len(), "emitted wrappers");

        Ok(())
    }
}
