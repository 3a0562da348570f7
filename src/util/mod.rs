//! Shared utilities

pub mod config;
pub mod context;
pub mod diagnostic;
pub mod fs;
pub mod process;
pub mod shell;

pub use config::Settings;
pub use context::Session;
pub use diagnostic::Diagnostic;
pub use shell::{ColorChoice, Shell, Status, Verbosity};
