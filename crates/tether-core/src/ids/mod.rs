//!
//! Identifier types shared by the runtime and synthesized wrappers.
//!
//! Trace/span identifiers and their generator live in `trace`; endpoint
//! identity and request classification live in `endpoint`.
//!

mod endpoint;
mod trace;

pub use endpoint::*;
pub use trace::*;
