//! Core Tether runtime used by synthesized endpoint wrappers.
//!
//! Wrappers emitted by `tether-codegen` call into this crate to run the
//! call lifecycle of a single endpoint invocation:
//!
//!   begin-call → begin-request → isolated execution → finish-request → finish-call
//!
//! ## Layering
//!
//! - `ids/` owns trace/span identifiers and their generator.
//! - `runtime/` defines the runtime contract wrappers talk to, and the
//!   default tracing runtime.
//! - `dispatch` provides the isolation boundary (spawned task, panic
//!   recovery, one-shot rendezvous).
//! - `inputs`, `path` and `raw` are the mechanical helpers wrappers use for
//!   payloads, path rendering and HTTP passthrough.

pub mod context;
pub mod dispatch;
pub mod error;
pub mod ids;
pub mod inputs;
pub mod log;
pub mod metrics;
pub mod path;
pub mod raw;
pub mod runtime;

pub use context::{AuthInfo, Context};
pub use error::{Error, ErrorCode, round_trip};

/// Scalar types referenced by synthesized wrappers.
pub mod types {
    pub use ::uuid::Uuid;
}

///
/// Crate Version
///

pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
