//! Sanitization of resolved documents.
//!
//! Sanitization turns a flattened raw document into the current shape:
//!
//! 1. inject `$schema`
//! 2. migrate legacy shapes (see [`migrations`](crate::config::migrations))
//! 3. default `remoteBuild` to `"none"`
//! 4. keep the backend generator flags in sync with `remoteBuild`
//! 5. derive `env.CHROMIUM_BUILDTOOLS_PATH` from `root`
//! 6. validate, unless the policy is `none`
//!
//! Every step is a no-op on a document it has already processed, so
//! sanitizing twice gives the same result as sanitizing once. Deciding what
//! to do with the outcome (persist, warn, fail) is left to the caller.

use std::path::Path;

use serde_json::{Map, Value};

use crate::config::gn_args;
use crate::config::migrations::{self, DocumentVersion};
use crate::config::validator::{SchemaValidator, ValidationIssue};
use crate::core::document::{
    keys, GeneratorFlag, RemoteBuild, ValidationPolicy, BUILDTOOLS_ENV_KEY, SCHEMA_REF,
};

/// Result of sanitizing one document.
#[derive(Debug, Clone)]
pub struct SanitizeOutcome {
    /// The sanitized document.
    pub document: Value,
    /// Human-readable description of each change made.
    pub changes: Vec<String>,
    /// Validation issues; always empty when `policy` is `none`.
    pub issues: Vec<ValidationIssue>,
    /// Policy that applies to this document.
    pub policy: ValidationPolicy,
    /// Shape the document was in before migration.
    pub version: DocumentVersion,
}

impl SanitizeOutcome {
    pub fn is_changed(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Applies the sanitization steps to raw documents.
#[derive(Debug, Clone, Default)]
pub struct ConfigSanitizer {
    validator: SchemaValidator,
    policy_override: Option<ValidationPolicy>,
}

impl ConfigSanitizer {
    pub fn new(validator: SchemaValidator) -> Self {
        ConfigSanitizer {
            validator,
            policy_override: None,
        }
    }

    /// Use `policy` instead of the document's own `configValidationLevel`.
    pub fn with_policy_override(mut self, policy: Option<ValidationPolicy>) -> Self {
        self.policy_override = policy;
        self
    }

    /// The policy that applies to `document`.
    pub fn policy_for(&self, document: &Value) -> ValidationPolicy {
        self.policy_override.unwrap_or_else(|| {
            document
                .get(keys::VALIDATION_LEVEL)
                .and_then(Value::as_str)
                .and_then(|raw| raw.parse().ok())
                .unwrap_or_default()
        })
    }

    /// Sanitize `document`.
    ///
    /// Documents that aren't JSON objects are left as they are and only
    /// validated.
    pub fn sanitize(&self, mut document: Value) -> SanitizeOutcome {
        let mut changes = Vec::new();
        let mut version = DocumentVersion::Current;

        if let Value::Object(ref mut map) = document {
            inject_schema(map, &mut changes);
            version = migrations::migrate(map, &mut changes);
            default_remote_build(map, &mut changes);
            sync_generator_flags(map, &mut changes);
            derive_buildtools_path(map, &mut changes);
        }

        let policy = self.policy_for(&document);
        let issues = match policy {
            ValidationPolicy::None => Vec::new(),
            _ => self.validator.validate(&document),
        };

        for change in &changes {
            tracing::debug!("sanitize: {}", change);
        }

        SanitizeOutcome {
            document,
            changes,
            issues,
            policy,
            version,
        }
    }
}

fn inject_schema(document: &mut Map<String, Value>, changes: &mut Vec<String>) {
    if !document.contains_key(keys::SCHEMA) {
        document.insert(keys::SCHEMA.to_string(), Value::String(SCHEMA_REF.to_string()));
        changes.push(format!("added `{}` reference", keys::SCHEMA));
    }
}

fn default_remote_build(document: &mut Map<String, Value>, changes: &mut Vec<String>) {
    if document.get(keys::REMOTE_BUILD).map_or(true, Value::is_null) {
        document.insert(
            keys::REMOTE_BUILD.to_string(),
            Value::String(RemoteBuild::None.as_str().to_string()),
        );
        changes.push(format!(
            "set `{}` to \"{}\" since it was not set",
            keys::REMOTE_BUILD,
            RemoteBuild::None
        ));
    }
}

fn sync_generator_flags(document: &mut Map<String, Value>, changes: &mut Vec<String>) {
    // Unknown modes are left for validation to report.
    let Some(mode) = document
        .get(keys::REMOTE_BUILD)
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<RemoteBuild>().ok())
    else {
        return;
    };
    let wanted = mode.generator_flag();

    let has_args = document
        .get(keys::GEN)
        .is_some_and(|g| g.get(keys::GEN_ARGS).is_some());
    if wanted.is_none() && !has_args {
        return;
    }

    let gen = document
        .entry(keys::GEN.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(gen) = gen else {
        return;
    };
    let args = gen
        .entry(keys::GEN_ARGS.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    let Value::Array(args) = args else {
        return;
    };

    for flag in GeneratorFlag::ALL {
        let enabled = wanted == Some(flag);
        let canonical = flag.enabled_arg();
        let mut kept = false;

        args.retain(|arg| {
            let Some(text) = arg.as_str() else {
                return true;
            };
            if !gn_args::assigns(text, flag.key) {
                return true;
            }
            if enabled && !kept && text.trim() == canonical {
                kept = true;
                return true;
            }
            changes.push(format!("removed `{}` from generator arguments", text.trim()));
            false
        });

        if enabled && !kept {
            args.push(Value::String(canonical.clone()));
            changes.push(format!("added `{}` to generator arguments", canonical));
        }
    }
}

fn derive_buildtools_path(document: &mut Map<String, Value>, changes: &mut Vec<String>) {
    let Some(root) = document
        .get(keys::ROOT)
        .and_then(Value::as_str)
        .filter(|r| !r.is_empty())
    else {
        return;
    };
    let derived = Path::new(root)
        .join("src")
        .join("buildtools")
        .display()
        .to_string();

    let env = document
        .entry(keys::ENV.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(env) = env else {
        return;
    };

    if !env.contains_key(BUILDTOOLS_ENV_KEY) {
        env.insert(BUILDTOOLS_ENV_KEY.to_string(), Value::String(derived.clone()));
        changes.push(format!(
            "set `{}.{}` to {}",
            keys::ENV,
            BUILDTOOLS_ENV_KEY,
            derived
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sanitize(doc: Value) -> SanitizeOutcome {
        ConfigSanitizer::default().sanitize(doc)
    }

    fn args(outcome: &SanitizeOutcome) -> Vec<&str> {
        outcome.document["gen"]["args"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect()
    }

    fn count(args: &[&str], key: &str) -> usize {
        args.iter().filter(|a| gn_args::assigns(a, key)).count()
    }

    fn samples() -> Vec<Value> {
        vec![
            json!({}),
            json!({ "root": "/src" }),
            json!({ "reclient": "none", "root": "/e", "gen": { "args": ["use_remoteexec = true"], "out": "T" } }),
            json!({ "goma": "cluster", "root": "/e", "gen": { "args": ["use_goma = true", "use_siso = true"], "out": "T" } }),
            json!({ "remoteBuild": "siso", "gen": { "args": ["use_siso=true", "use_siso = true", "use_remoteexec = false"] } }),
            json!({ "remoteBuild": "reclient", "gen": "bogus", "env": [] }),
            json!({ "remoteBuild": "bogus", "gen": { "args": ["use_siso = true"] } }),
            json!({ "remoteBuild": null, "gen": { "args": ["use_remoteexec = true"] } }),
            json!(["not", "an", "object"]),
        ]
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for doc in samples() {
            let once = sanitize(doc.clone());
            let twice = sanitize(once.document.clone());
            assert_eq!(once.document, twice.document, "input: {}", doc);
            assert!(twice.changes.is_empty(), "input: {} changes: {:?}", doc, twice.changes);
        }
    }

    #[test]
    fn test_reclient_none_scenario() {
        let outcome = sanitize(json!({ "reclient": "none", "root": "/e" }));
        assert_eq!(outcome.document["remoteBuild"], "none");
        assert!(outcome.document.get("reclient").is_none());
        assert_eq!(outcome.version, DocumentVersion::ReclientEra);
    }

    #[test]
    fn test_remote_build_defaults_to_none() {
        let outcome = sanitize(json!({ "root": "/e" }));
        assert_eq!(outcome.document["remoteBuild"], "none");
        assert!(outcome.changes.iter().any(|c| c.contains("remoteBuild")));
    }

    #[test]
    fn test_null_remote_build_is_unset() {
        let outcome = ConfigSanitizer::default()
            .with_policy_override(Some(ValidationPolicy::Warn))
            .sanitize(json!({
                "root": "/e",
                "remoteBuild": null,
                "gen": { "args": ["use_remoteexec = true"], "out": "T" }
            }));

        assert_eq!(outcome.document["remoteBuild"], "none");
        assert_eq!(count(&args(&outcome), "use_remoteexec"), 0);
        assert!(outcome.issues.is_empty(), "issues: {:?}", outcome.issues);
    }

    #[test]
    fn test_null_goma_stays_local() {
        let outcome = sanitize(json!({
            "root": "/e",
            "goma": null,
            "gen": { "args": ["use_goma = true", "use_remoteexec = true"], "out": "T" }
        }));

        assert_eq!(outcome.document["remoteBuild"], "none");
        assert!(args(&outcome).is_empty());
        assert!(outcome.is_valid(), "issues: {:?}", outcome.issues);
    }

    #[test]
    fn test_reclient_flag_exactly_once() {
        let outcome = sanitize(json!({
            "remoteBuild": "reclient",
            "gen": { "args": ["use_remoteexec = true", "use_siso = true", "use_remoteexec = true", "is_debug = false"], "out": "T" }
        }));
        let args = args(&outcome);
        assert_eq!(count(&args, "use_remoteexec"), 1);
        assert_eq!(count(&args, "use_siso"), 0);
        assert_eq!(args, vec!["use_remoteexec = true", "is_debug = false"]);
    }

    #[test]
    fn test_siso_flag_added() {
        let outcome = sanitize(json!({ "remoteBuild": "siso", "gen": { "args": ["use_remoteexec = true"] } }));
        assert_eq!(args(&outcome), vec!["use_siso = true"]);
    }

    #[test]
    fn test_disabled_removes_both_flags() {
        let outcome = sanitize(json!({
            "remoteBuild": "none",
            "gen": { "args": ["use_remoteexec = true", "import(\"//x.gn\")", "use_siso = false"] }
        }));
        assert_eq!(args(&outcome), vec!["import(\"//x.gn\")"]);
        assert_eq!(outcome.changes.iter().filter(|c| c.starts_with("removed")).count(), 2);
    }

    #[test]
    fn test_enabled_without_args_creates_them() {
        let outcome = sanitize(json!({ "remoteBuild": "reclient" }));
        assert_eq!(args(&outcome), vec!["use_remoteexec = true"]);
    }

    #[test]
    fn test_unknown_mode_leaves_args() {
        let outcome = sanitize(json!({ "remoteBuild": "bogus", "gen": { "args": ["use_siso = true"] } }));
        assert_eq!(args(&outcome), vec!["use_siso = true"]);
        assert!(outcome.issues.iter().any(|i| i.path == "remoteBuild"));
    }

    #[test]
    fn test_buildtools_derived_from_root() {
        let outcome = sanitize(json!({ "root": "/src/electron", "env": { "A": "1" } }));
        let expected = Path::new("/src/electron").join("src").join("buildtools");
        assert_eq!(
            outcome.document["env"]["CHROMIUM_BUILDTOOLS_PATH"],
            expected.display().to_string()
        );
        assert_eq!(outcome.document["env"]["A"], "1");
    }

    #[test]
    fn test_buildtools_kept_when_present() {
        let outcome = sanitize(json!({ "root": "/e", "env": { "CHROMIUM_BUILDTOOLS_PATH": "/custom" } }));
        assert_eq!(outcome.document["env"]["CHROMIUM_BUILDTOOLS_PATH"], "/custom");
    }

    #[test]
    fn test_buildtools_skipped_without_root() {
        let outcome = sanitize(json!({}));
        assert!(outcome.document.get("env").is_none());
        assert!(outcome.issues.iter().any(|i| i.path == "root"));
    }

    #[test]
    fn test_conformant_document_is_valid() {
        let outcome = sanitize(json!({
            "root": "/src/electron",
            "gen": { "args": [], "out": "Testing" }
        }));
        assert!(outcome.is_valid(), "issues: {:?}", outcome.issues);
        assert_eq!(outcome.policy, ValidationPolicy::Strict);
    }

    #[test]
    fn test_policy_none_skips_validation() {
        let outcome = sanitize(json!({ "configValidationLevel": "none" }));
        assert_eq!(outcome.policy, ValidationPolicy::None);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_policy_override() {
        let sanitizer = ConfigSanitizer::default().with_policy_override(Some(ValidationPolicy::Warn));
        let outcome = sanitizer.sanitize(json!({ "configValidationLevel": "strict" }));
        assert_eq!(outcome.policy, ValidationPolicy::Warn);
        assert!(!outcome.issues.is_empty());
    }

    #[test]
    fn test_non_object_only_validated() {
        let outcome = sanitize(json!("nope"));
        assert_eq!(outcome.document, json!("nope"));
        assert!(outcome.changes.is_empty());
        assert_eq!(outcome.issues.len(), 1);
    }
}
