//! berth - build-configuration resolution and remote-execution environment engine
//!
//! This crate turns named, possibly inherited and possibly outdated build
//! configuration documents into validated configurations, and composes the
//! process environment used to run the build and remote-execution tools.

pub mod config;
pub mod core;
pub mod env;
pub mod ops;
pub mod util;

/// Test utilities and mocks for berth unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a recording process executor and document
/// fixtures.
#[cfg(test)]
pub mod test_support;

pub use config::{ConfigError, ConfigResolver, ConfigSanitizer, ConfigStore, SchemaValidator};
pub use core::{RemoteBuild, ResolvedConfig, ValidationPolicy};
pub use env::{CredentialError, EnvironmentComposer};
pub use util::context::Session;
