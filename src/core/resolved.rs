//! The resolved configuration consumed by the rest of the tool.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::document::{keys, RemoteBuild};

/// A named VCS remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remote {
    /// Upstream URL.
    pub origin: String,

    /// Personal fork URL, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fork: Option<String>,
}

/// A configuration after inheritance flattening and sanitization.
///
/// The underlying document is kept as-is so that a configuration accepted
/// under the `warn` policy is still usable even when it doesn't fully
/// conform to the schema. Accessors are lenient and fall back to the
/// schema defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    name: String,
    document: Value,
}

impl ResolvedConfig {
    /// Wrap a sanitized document.
    pub fn new(name: impl Into<String>, document: Value) -> Self {
        ResolvedConfig {
            name: name.into(),
            document,
        }
    }

    /// The configuration name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.document.get(key).and_then(Value::as_str)
    }

    /// Root of the managed source tree.
    pub fn root(&self) -> Option<&str> {
        self.str_field(keys::ROOT).filter(|r| !r.is_empty())
    }

    /// Remote-execution mode. Unknown values are treated as disabled.
    pub fn remote_build(&self) -> RemoteBuild {
        match self.str_field(keys::REMOTE_BUILD) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("{}; treating `{}` as local build", e, self.name);
                RemoteBuild::None
            }),
            None => RemoteBuild::None,
        }
    }

    /// Generator arguments, in order. Non-string entries are skipped.
    pub fn gen_args(&self) -> Vec<&str> {
        self.document
            .get(keys::GEN)
            .and_then(|g| g.get(keys::GEN_ARGS))
            .and_then(Value::as_array)
            .map(|args| args.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Generator output directory name.
    pub fn out_dir(&self) -> Option<&str> {
        self.document
            .get(keys::GEN)
            .and_then(|g| g.get(keys::GEN_OUT))
            .and_then(Value::as_str)
            .filter(|o| !o.is_empty())
    }

    /// The configuration's own environment map. Non-string values are skipped.
    pub fn env(&self) -> BTreeMap<String, String> {
        self.document
            .get(keys::ENV)
            .and_then(Value::as_object)
            .map(|env| {
                env.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Named VCS remotes. Entries that don't have the expected shape are skipped.
    pub fn remotes(&self) -> BTreeMap<String, Remote> {
        self.document
            .get(keys::REMOTES)
            .and_then(Value::as_object)
            .map(|remotes| {
                remotes
                    .iter()
                    .filter_map(|(name, v)| {
                        serde_json::from_value::<Remote>(v.clone())
                            .ok()
                            .map(|r| (name.clone(), r))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Credential-helper override.
    pub fn rbe_helper_path(&self) -> Option<&str> {
        self.str_field(keys::RBE_HELPER_PATH)
    }

    /// Remote-execution service address override.
    pub fn rbe_service_address(&self) -> Option<&str> {
        self.str_field(keys::RBE_SERVICE_ADDRESS)
    }

    /// Remote-execution project/instance override.
    pub fn rbe_instance(&self) -> Option<&str> {
        self.str_field(keys::RBE_INSTANCE)
    }
}
