//! Loading a configuration: resolve, sanitize, enforce policy.

use std::path::PathBuf;

use crate::config::{ConfigError, ConfigResolver, ConfigSanitizer, DocumentVersion, ValidationIssue};
use crate::core::{ResolvedConfig, ValidationPolicy};
use crate::util::context::Session;
use crate::util::diagnostic::{emit, suggestions, Diagnostic};

/// Options for loading a configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Write automatic changes back to the store
    pub save: bool,

    /// Don't report automatic changes; the caller shows them itself
    pub quiet_changes: bool,
}

/// A loaded configuration and what sanitization did to it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ResolvedConfig,
    pub changes: Vec<String>,
    /// Issues tolerated under the `warn` policy
    pub issues: Vec<ValidationIssue>,
    pub policy: ValidationPolicy,
    pub version: DocumentVersion,
    /// Where changes were written, when saving was requested
    pub saved_to: Option<PathBuf>,
}

/// Resolve, sanitize, and validate the configuration `name`.
///
/// Under the `strict` policy any validation issue is returned as
/// [`ConfigError::Validation`] and nothing is saved. Under `warn` the issues
/// are logged and the configuration is returned anyway.
///
/// When sanitization changed the document it is written back if
/// `opts.save` is set; otherwise the changes are reported once per session.
pub fn load_config(
    session: &Session,
    name: &str,
    opts: &LoadOptions,
) -> Result<LoadedConfig, ConfigError> {
    let store = session.store();
    let raw = ConfigResolver::new(&store).resolve(name)?;

    let outcome = ConfigSanitizer::default()
        .with_policy_override(session.validation_override())
        .sanitize(raw);

    if !outcome.issues.is_empty() {
        match outcome.policy {
            ValidationPolicy::Strict => {
                return Err(ConfigError::Validation {
                    name: name.to_string(),
                    issues: outcome.issues,
                });
            }
            ValidationPolicy::Warn => report(session, &validation_warning(name, &outcome.issues)),
            ValidationPolicy::None => {}
        }
    }

    let mut saved_to = None;
    if outcome.is_changed() {
        if opts.save {
            let path = store.save(name, &outcome.document)?;
            tracing::info!(
                "saved {} change(s) to `{}` ({})",
                outcome.changes.len(),
                name,
                path.display()
            );
            saved_to = Some(path);
        } else if !opts.quiet_changes && session.take_change_warning() {
            report(session, &change_warning(name, &outcome.changes));
        }
    }

    Ok(LoadedConfig {
        config: ResolvedConfig::new(name, outcome.document),
        changes: outcome.changes,
        issues: outcome.issues,
        policy: outcome.policy,
        version: outcome.version,
        saved_to,
    })
}

/// Load the session's current configuration.
pub fn load_current(session: &Session, opts: &LoadOptions) -> Result<LoadedConfig, ConfigError> {
    let name = session.require_current()?.to_string();
    load_config(session, &name, opts)
}

fn validation_warning(name: &str, issues: &[ValidationIssue]) -> Diagnostic {
    let diag = Diagnostic::warning(format!(
        "configuration `{}` failed validation; using it anyway",
        name
    ));
    issues
        .iter()
        .fold(diag, |diag, issue| diag.with_context(issue.to_string()))
}

fn change_warning(name: &str, changes: &[String]) -> Diagnostic {
    let diag = Diagnostic::warning(format!("configuration `{}` was updated in memory", name));
    changes
        .iter()
        .fold(diag, |diag, change| diag.with_context(change.clone()))
        .with_suggestion(suggestions::SAVE_CHANGES)
}

fn report(session: &Session, diag: &Diagnostic) {
    if !session.is_quiet() {
        emit(diag, session.color());
    }
}
