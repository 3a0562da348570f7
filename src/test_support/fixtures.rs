//! Test fixtures for common test scenarios.
//!
//! Document generators for the shapes berth has written over time, and a
//! session rooted in a temporary home directory.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{json, Value};

use crate::util::context::{Session, ENV_HOME};

/// A session whose home and working directory are both `home`.
pub fn session_in(home: &Path) -> Session {
    let env = BTreeMap::from([(ENV_HOME.to_string(), home.display().to_string())]);
    Session::new(home.to_path_buf(), env).expect("failed to create test session")
}

fn buildtools(root: &str) -> String {
    Path::new(root)
        .join("src")
        .join("buildtools")
        .display()
        .to_string()
}

/// A fully conformant, local-build document.
pub fn sample_document(root: &str) -> Value {
    json!({
        "$schema": crate::core::SCHEMA_REF,
        "root": root,
        "remoteBuild": "none",
        "gen": {
            "args": ["import(\"//electron/build/args/testing.gn\")"],
            "out": "Testing"
        },
        "env": { "CHROMIUM_BUILDTOOLS_PATH": buildtools(root) },
        "remotes": {
            "electron": { "origin": "https://github.com/electron/electron.git" }
        }
    })
}

/// A document from the `reclient` era with remote execution turned off.
pub fn reclient_legacy_document(root: &str) -> Value {
    json!({
        "root": root,
        "reclient": "none",
        "gen": {
            "args": ["import(\"//electron/build/args/testing.gn\")"],
            "out": "Testing"
        },
        "env": { "CHROMIUM_BUILDTOOLS_PATH": buildtools(root) }
    })
}

/// A document from the `goma` era with the cluster backend turned on.
pub fn goma_legacy_document(root: &str) -> Value {
    json!({
        "root": root,
        "goma": "cluster",
        "gen": {
            "args": [
                "import(\"//electron/build/args/release.gn\")",
                "use_goma = true",
                "goma_dir = \"/opt/goma\""
            ],
            "out": "Release"
        },
        "env": {}
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigSanitizer, DocumentVersion};

    #[test]
    fn test_sample_document_is_clean() {
        let outcome = ConfigSanitizer::default().sanitize(sample_document("/src/electron"));
        assert!(outcome.changes.is_empty(), "changes: {:?}", outcome.changes);
        assert!(outcome.is_valid(), "issues: {:?}", outcome.issues);
    }

    #[test]
    fn test_goma_document_migrates_to_reclient() {
        let outcome = ConfigSanitizer::default().sanitize(goma_legacy_document("/src/electron"));
        assert_eq!(outcome.version, DocumentVersion::GomaEra);
        assert!(outcome.is_valid(), "issues: {:?}", outcome.issues);
        assert_eq!(outcome.document["remoteBuild"], "reclient");
        assert_eq!(
            outcome.document["gen"]["args"],
            json!(["import(\"//electron/build/args/release.gn\")", "use_remoteexec = true"])
        );
    }
}
