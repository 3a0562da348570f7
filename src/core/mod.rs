//! Core data structures for berth.
//!
//! - Document vocabulary (field names, remote-build modes, validation levels)
//! - The resolved configuration handed to the rest of the tool

pub mod document;
pub mod resolved;

pub use document::{GeneratorFlag, RemoteBuild, ValidationPolicy, BUILDTOOLS_ENV_KEY, SCHEMA_REF};
pub use resolved::{Remote, ResolvedConfig};
