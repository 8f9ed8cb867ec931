//! Source emission backends.
//!
//! Synthesis produces token streams; a backend decides how they become
//! source text. [`SourceBuffer`] collects everything into one string.

use crate::{descriptor::EndpointDescriptor, error::SynthError};
use proc_macro2::TokenStream as TokenStream2;

///
/// EmitBackend
///

pub trait EmitBackend {
    fn emit(&mut self, endpoint: &EndpointDescriptor, item: TokenStream2)
    -> Result<(), SynthError>;
}

///
/// SourceBuffer
///

#[derive(Debug, Default)]
pub struct SourceBuffer {
    items: Vec<(String, TokenStream2)>,
}

impl SourceBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Labels of the emitted endpoints, in emission order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|(label, _)| label.as_str())
    }

    /// All emitted items as one source file.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        for (label, item) in &self.items {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str("// ");
            out.push_str(label);
            out.push('\n');
            out.push_str(&item.to_string());
            out.push('\n');
        }

        out
    }
}

impl EmitBackend for SourceBuffer {
    fn emit(
        &mut self,
        endpoint: &EndpointDescriptor,
        item: TokenStream2,
    ) -> Result<(), SynthError> {
        self.items.push((endpoint.label(), item));

        Ok(())
    }
}
