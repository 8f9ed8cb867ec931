//! Workspace-only service for the lifecycle tests.
//!
//! [`app`] holds ordinary endpoint handlers. [`wrappers`] is synthesized
//! from `endpoints.json` by the build script, so the tests drive exactly
//! what `tether-codegen` emits.

pub mod app;

pub mod wrappers {
    include!(concat!(env!("OUT_DIR"), "/wrappers.rs"));
}
