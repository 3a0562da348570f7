//! Schema validation of resolved documents.
//!
//! Interprets the subset of JSON Schema that [`config_schema`] uses:
//! `type`, `enum`, `minLength`, `required`, `properties`,
//! `additionalProperties` and `items`. Validation never fails as an
//! operation; malformed input just yields issues.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::schema::config_schema;
use crate::core::document::keys;

/// Why a field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    MissingProperty,
    WrongType { expected: String, found: String },
    NotInEnum { allowed: Vec<String>, found: String },
    TooShort { min: u64 },
    UnknownProperty,
    MultipleForks { remotes: Vec<String> },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::MissingProperty => write!(f, "missing required property"),
            IssueKind::WrongType { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            IssueKind::NotInEnum { allowed, found } => {
                write!(f, "{} is not one of: {}", found, allowed.join(", "))
            }
            IssueKind::TooShort { min } => {
                if *min == 1 {
                    write!(f, "must not be empty")
                } else {
                    write!(f, "must be at least {} characters", min)
                }
            }
            IssueKind::UnknownProperty => write!(f, "unknown property"),
            IssueKind::MultipleForks { remotes } => write!(
                f,
                "at most one remote may have a fork, found {}",
                remotes.join(", ")
            ),
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Dotted path of the offending field (`gen.out`, `gen.args[2]`);
    /// empty for the document itself.
    pub path: String,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, kind: IssueKind) -> Self {
        ValidationIssue {
            path: path.into(),
            kind,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "<document>: {}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

/// Validates documents against a JSON schema.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    schema: Value,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        SchemaValidator::new(config_schema())
    }
}

impl SchemaValidator {
    pub fn new(schema: Value) -> Self {
        SchemaValidator { schema }
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Check `document`, returning every issue found.
    pub fn validate(&self, document: &Value) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        check(&self.schema, document, "", &mut issues);
        check_single_fork(document, &mut issues);
        issues
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        other => type_name(value) == other,
    }
}

fn check(schema: &Value, value: &Value, path: &str, issues: &mut Vec<ValidationIssue>) {
    if let Some(expected) = schema.get("type") {
        let allowed: Vec<&str> = match expected {
            Value::String(t) => vec![t.as_str()],
            Value::Array(ts) => ts.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };
        if !allowed.is_empty() && !allowed.iter().any(|t| type_matches(t, value)) {
            issues.push(ValidationIssue::new(
                path,
                IssueKind::WrongType {
                    expected: allowed.join(" or "),
                    found: type_name(value).to_string(),
                },
            ));
            return;
        }
    }

    if let Some(Value::Array(choices)) = schema.get("enum") {
        if !choices.contains(value) {
            issues.push(ValidationIssue::new(
                path,
                IssueKind::NotInEnum {
                    allowed: choices.iter().map(|c| c.to_string()).collect(),
                    found: value.to_string(),
                },
            ));
        }
    }

    if let (Some(min), Value::String(s)) = (schema.get("minLength").and_then(Value::as_u64), value)
    {
        if (s.chars().count() as u64) < min {
            issues.push(ValidationIssue::new(path, IssueKind::TooShort { min }));
        }
    }

    match value {
        Value::Object(map) => check_object(schema, map, path, issues),
        Value::Array(items) => {
            if let Some(item_schema) = schema.get("items") {
                for (i, item) in items.iter().enumerate() {
                    check(item_schema, item, &format!("{}[{}]", path, i), issues);
                }
            }
        }
        _ => {}
    }
}

fn check_object(
    schema: &Value,
    map: &Map<String, Value>,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    if let Some(Value::Array(required)) = schema.get("required") {
        for key in required.iter().filter_map(Value::as_str) {
            if !map.contains_key(key) {
                issues.push(ValidationIssue::new(
                    child_path(path, key),
                    IssueKind::MissingProperty,
                ));
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    let additional = schema.get("additionalProperties");

    for (key, child) in map {
        let sub_path = child_path(path, key);
        match properties.and_then(|p| p.get(key)) {
            Some(child_schema) => check(child_schema, child, &sub_path, issues),
            None => match additional {
                Some(Value::Bool(false)) => {
                    issues.push(ValidationIssue::new(sub_path, IssueKind::UnknownProperty))
                }
                Some(extra @ Value::Object(_)) => check(extra, child, &sub_path, issues),
                _ => {}
            },
        }
    }
}

fn check_single_fork(document: &Value, issues: &mut Vec<ValidationIssue>) {
    let Some(remotes) = document.get(keys::REMOTES).and_then(Value::as_object) else {
        return;
    };

    let with_fork: Vec<String> = remotes
        .iter()
        .filter(|(_, r)| r.get("fork").is_some_and(|f| !f.is_null()))
        .map(|(name, _)| name.clone())
        .collect();

    if with_fork.len() > 1 {
        issues.push(ValidationIssue::new(
            keys::REMOTES,
            IssueKind::MultipleForks { remotes: with_fork },
        ));
    }
}
