//! Configuration error types and diagnostics.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::format::DocumentFormat;
use crate::config::validator::ValidationIssue;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error while locating, resolving, validating, or persisting a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration `{name}` not found")]
    NotFound {
        name: String,
        /// Directory that was searched
        dir: PathBuf,
        /// Configuration whose `extends` named this one
        required_by: Option<String>,
    },

    #[error("configuration `{name}` exists in more than one format")]
    Ambiguous { name: String, paths: Vec<PathBuf> },

    #[error("invalid configuration name `{name}`: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("configuration `{name}` already exists")]
    AlreadyExists { name: String, path: PathBuf },

    #[error("inheritance cycle detected: {}", chain.join(" -> "))]
    InheritanceCycle { chain: Vec<String> },

    #[error("configuration `{name}` has a non-string `extends` value")]
    InvalidExtends { name: String, path: PathBuf },

    #[error("failed to parse {format} document {}", path.display())]
    Parse {
        path: PathBuf,
        format: DocumentFormat,
        message: String,
    },

    #[error("configuration `{name}` failed validation")]
    Validation {
        name: String,
        issues: Vec<ValidationIssue>,
    },

    #[error("failed to save configuration `{name}` to {}", path.display())]
    Persistence {
        name: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no configuration is selected")]
    NoCurrent,
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ConfigError::NotFound {
                name,
                dir,
                required_by,
            } => {
                let mut diag = Diagnostic::error(format!("configuration `{}` not found", name))
                    .with_context(format!("searched {}", dir.display()));
                if let Some(child) = required_by {
                    diag = diag.with_context(format!("`{}` extends `{}`", child, name));
                }
                diag.with_suggestion(suggestions::LIST_CONFIGS)
                    .with_suggestion(suggestions::INIT_CONFIG)
            }

            ConfigError::Ambiguous { name, paths } => {
                let mut diag = Diagnostic::error(format!(
                    "configuration `{}` exists in more than one format",
                    name
                ));
                for path in paths {
                    diag = diag.with_context(path.display().to_string());
                }
                diag.with_suggestion("Delete all but one of these files")
            }

            ConfigError::InvalidName { name, reason } => {
                Diagnostic::error(format!("invalid configuration name `{}`", name))
                    .with_context(reason.clone())
                    .with_suggestion("Use a plain name such as `testing` or `release-x64`")
            }

            ConfigError::AlreadyExists { name, path } => {
                Diagnostic::error(format!("configuration `{}` already exists", name))
                    .with_location(path)
                    .with_suggestion("Pass `--force` to overwrite it")
            }

            ConfigError::InheritanceCycle { chain } => {
                Diagnostic::error("inheritance cycle detected")
                    .with_context(format!("cycle: {}", chain.join(" -> ")))
                    .with_suggestion("Remove one of the `extends` entries to break the cycle")
            }

            ConfigError::InvalidExtends { name, path } => Diagnostic::error(format!(
                "configuration `{}` has a non-string `extends` value",
                name
            ))
            .with_location(path)
            .with_suggestion("Set `extends` to the name of another configuration"),

            ConfigError::Parse {
                path,
                format,
                message,
            } => Diagnostic::error(format!("failed to parse {} document", format))
                .with_location(path)
                .with_context(message.clone())
                .with_suggestion(format!("Fix the {} syntax at the position above", format))
                .with_suggestion(suggestions::LIST_CONFIGS),

            ConfigError::Validation { name, issues } => {
                let mut diag =
                    Diagnostic::error(format!("configuration `{}` failed validation", name));
                for issue in issues {
                    diag = diag.with_context(issue.to_string());
                }
                diag.with_suggestion(format!("Fix the fields above in `{}`", name))
                    .with_suggestion(suggestions::RELAX_VALIDATION)
            }

            ConfigError::Persistence { name, path, source } => {
                Diagnostic::error(format!("failed to save configuration `{}`", name))
                    .with_location(path)
                    .with_context(source.to_string())
                    .with_suggestion("Check that the configuration directory is writable")
            }

            ConfigError::Io { path, source } => {
                let diag = Diagnostic::error(format!("failed to access {}", path.display()))
                    .with_context(source.to_string());
                match source.kind() {
                    io::ErrorKind::PermissionDenied => diag.with_suggestion(format!(
                        "Check the permissions of {}",
                        path.display()
                    )),
                    _ => diag.with_suggestion(
                        "Set BERTH_HOME to a readable and writable directory",
                    ),
                }
            }

            ConfigError::NoCurrent => Diagnostic::error("no configuration is selected")
                .with_suggestion(suggestions::NO_CURRENT)
                .with_suggestion(suggestions::INIT_CONFIG),
        }
    }
}
