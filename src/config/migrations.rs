//! Migration of legacy document shapes.
//!
//! The shape of a document is detected once as a [`DocumentVersion`]; the
//! document is then walked forward one transition at a time through
//! [`MIGRATIONS`], each transition being a named function that removes the
//! deprecated key it consumed. Documents already at [`DocumentVersion::Current`]
//! are never touched.

use std::fmt;

use serde_json::{Map, Value};

use crate::config::gn_args;
use crate::core::document::{keys, RemoteBuild};

/// Generator arguments that only made sense with goma.
const GOMA_ARGS: [&str; 2] = ["use_goma", "goma_dir"];

/// Shape generation of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DocumentVersion {
    /// Remote execution selected through `goma`.
    GomaEra,
    /// Remote execution selected through `reclient`.
    ReclientEra,
    /// Remote execution selected through `remoteBuild`.
    Current,
}

impl DocumentVersion {
    /// Detect the oldest shape present in `document`.
    pub fn detect(document: &Map<String, Value>) -> Self {
        if document.contains_key(keys::LEGACY_GOMA) {
            DocumentVersion::GomaEra
        } else if document.contains_key(keys::LEGACY_RECLIENT) {
            DocumentVersion::ReclientEra
        } else {
            DocumentVersion::Current
        }
    }
}

impl fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentVersion::GomaEra => "goma-era",
            DocumentVersion::ReclientEra => "reclient-era",
            DocumentVersion::Current => "current",
        };
        f.write_str(s)
    }
}

/// A single shape transition.
pub struct Migration {
    pub from: DocumentVersion,
    pub to: DocumentVersion,
    pub name: &'static str,
    pub apply: fn(&mut Map<String, Value>, &mut Vec<String>),
}

/// Every known transition, oldest first.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        from: DocumentVersion::GomaEra,
        to: DocumentVersion::ReclientEra,
        name: "goma-to-reclient",
        apply: goma_to_reclient,
    },
    Migration {
        from: DocumentVersion::ReclientEra,
        to: DocumentVersion::Current,
        name: "reclient-to-remote-build",
        apply: reclient_to_remote_build,
    },
];

/// Bring `document` up to [`DocumentVersion::Current`].
///
/// Returns the version the document was detected as. Descriptions of what
/// changed are appended to `changes`.
pub fn migrate(document: &mut Map<String, Value>, changes: &mut Vec<String>) -> DocumentVersion {
    let detected = DocumentVersion::detect(document);
    let mut version = detected;

    while version != DocumentVersion::Current {
        let Some(step) = MIGRATIONS.iter().find(|m| m.from == version) else {
            break;
        };
        tracing::debug!("applying migration `{}`", step.name);
        (step.apply)(document, changes);
        version = step.to;
    }

    detected
}

/// Whether `key` holds a value. A null counts as unset.
fn is_set(document: &Map<String, Value>, key: &str) -> bool {
    document.get(key).is_some_and(|v| !v.is_null())
}

/// Only `"none"` or a null turns a legacy backend off.
fn is_disabled(value: &Value) -> bool {
    value.is_null() || value.as_str() == Some("none")
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}

fn goma_to_reclient(document: &mut Map<String, Value>, changes: &mut Vec<String>) {
    let Some(goma) = document.remove(keys::LEGACY_GOMA) else {
        return;
    };

    if is_set(document, keys::LEGACY_RECLIENT) || is_set(document, keys::REMOTE_BUILD) {
        changes.push(format!(
            "removed deprecated `{}: {}`; a newer remote build setting is present",
            keys::LEGACY_GOMA,
            describe(&goma)
        ));
    } else {
        let reclient = if is_disabled(&goma) {
            "none"
        } else {
            "remote_exec"
        };
        document.insert(
            keys::LEGACY_RECLIENT.to_string(),
            Value::String(reclient.to_string()),
        );
        changes.push(format!(
            "migrated deprecated `{}: {}` to `{}: \"{}\"`",
            keys::LEGACY_GOMA,
            describe(&goma),
            keys::LEGACY_RECLIENT,
            reclient
        ));
    }

    let Some(args) = document
        .get_mut(keys::GEN)
        .and_then(|g| g.get_mut(keys::GEN_ARGS))
        .and_then(Value::as_array_mut)
    else {
        return;
    };

    let before = args.len();
    args.retain(|arg| {
        !arg
            .as_str()
            .and_then(gn_args::arg_key)
            .is_some_and(|key| GOMA_ARGS.contains(&key))
    });
    let removed = before - args.len();
    if removed > 0 {
        changes.push(format!("removed {} goma generator argument(s)", removed));
    }
}

fn reclient_to_remote_build(document: &mut Map<String, Value>, changes: &mut Vec<String>) {
    let Some(reclient) = document.remove(keys::LEGACY_RECLIENT) else {
        return;
    };

    if let Some(existing) = document.get(keys::REMOTE_BUILD).filter(|v| !v.is_null()) {
        changes.push(format!(
            "removed deprecated `{}: {}`; `{}` is already {}",
            keys::LEGACY_RECLIENT,
            describe(&reclient),
            keys::REMOTE_BUILD,
            describe(existing)
        ));
        return;
    }

    let mode = if is_disabled(&reclient) {
        RemoteBuild::None
    } else {
        RemoteBuild::Reclient
    };
    document.insert(
        keys::REMOTE_BUILD.to_string(),
        Value::String(mode.as_str().to_string()),
    );
    changes.push(format!(
        "migrated deprecated `{}: {}` to `{}: \"{}\"`",
        keys::LEGACY_RECLIENT,
        describe(&reclient),
        keys::REMOTE_BUILD,
        mode
    ));
}
