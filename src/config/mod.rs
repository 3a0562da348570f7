//! Configuration documents: storage, inheritance, migration, validation.
//!
//! The pipeline is
//! [`ConfigStore`] → [`ConfigResolver`] → [`ConfigSanitizer`] (using
//! [`SchemaValidator`]) → [`ResolvedConfig`](crate::core::ResolvedConfig).
//! Policy decisions about the sanitizer's outcome live in
//! [`ops::load`](crate::ops::load).

pub mod current;
pub mod errors;
pub mod format;
pub mod gn_args;
pub mod merge;
pub mod migrations;
pub mod resolver;
pub mod sanitizer;
pub mod schema;
pub mod store;
pub mod validator;

pub use current::{resolve_current_name, CurrentPointer};
pub use errors::ConfigError;
pub use format::DocumentFormat;
pub use migrations::DocumentVersion;
pub use resolver::ConfigResolver;
pub use sanitizer::{ConfigSanitizer, SanitizeOutcome};
pub use schema::config_schema;
pub use store::{ConfigStore, StoredDocument};
pub use validator::{IssueKind, SchemaValidator, ValidationIssue};
