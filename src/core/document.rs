//! Vocabulary of a configuration document.
//!
//! Documents are kept as `serde_json::Value` trees until sanitization is
//! done, so the field names live here as constants rather than as struct
//! fields. The enums below are the closed sets the schema enforces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Value injected into `$schema` when a document has none.
pub const SCHEMA_REF: &str = "berth://schema/config.v1.json";

/// Environment key every resolved document must carry.
pub const BUILDTOOLS_ENV_KEY: &str = "CHROMIUM_BUILDTOOLS_PATH";

/// Field names as they appear on disk.
pub mod keys {
    pub const SCHEMA: &str = "$schema";
    pub const ROOT: &str = "root";
    pub const REMOTE_BUILD: &str = "remoteBuild";
    pub const GEN: &str = "gen";
    pub const GEN_ARGS: &str = "args";
    pub const GEN_OUT: &str = "out";
    pub const ENV: &str = "env";
    pub const REMOTES: &str = "remotes";
    pub const EXTENDS: &str = "extends";
    pub const VALIDATION_LEVEL: &str = "configValidationLevel";
    pub const DEFAULT_TARGET: &str = "defaultTarget";
    pub const RBE_HELPER_PATH: &str = "rbeHelperPath";
    pub const RBE_SERVICE_ADDRESS: &str = "rbeServiceAddress";
    pub const RBE_INSTANCE: &str = "rbeInstance";

    /// Deprecated: superseded by `reclient`, then by `remoteBuild`.
    pub const LEGACY_GOMA: &str = "goma";
    /// Deprecated: superseded by `remoteBuild`.
    pub const LEGACY_RECLIENT: &str = "reclient";
}

/// Generator argument that switches a remote-execution backend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorFlag {
    /// GN variable name, e.g. `use_remoteexec`.
    pub key: &'static str,
}

impl GeneratorFlag {
    pub const REMOTEEXEC: GeneratorFlag = GeneratorFlag {
        key: "use_remoteexec",
    };
    pub const SISO: GeneratorFlag = GeneratorFlag { key: "use_siso" };

    /// Every backend flag the sanitizer keeps in sync.
    pub const ALL: [GeneratorFlag; 2] = [GeneratorFlag::REMOTEEXEC, GeneratorFlag::SISO];

    /// The canonical argument string for an enabled flag.
    pub fn enabled_arg(&self) -> String {
        format!("{} = true", self.key)
    }
}

/// Remote-execution mode of a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteBuild {
    /// Build locally.
    #[default]
    None,
    /// Remote execution through reclient.
    Reclient,
    /// Remote execution through siso.
    Siso,
}

impl RemoteBuild {
    /// Every accepted on-disk value, in schema order.
    pub const VARIANTS: [&'static str; 3] = ["none", "reclient", "siso"];

    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteBuild::None => "none",
            RemoteBuild::Reclient => "reclient",
            RemoteBuild::Siso => "siso",
        }
    }

    /// Check if a remote-execution backend is active.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, RemoteBuild::None)
    }

    /// The generator flag this mode requires, if any.
    pub fn generator_flag(&self) -> Option<GeneratorFlag> {
        match self {
            RemoteBuild::None => None,
            RemoteBuild::Reclient => Some(GeneratorFlag::REMOTEEXEC),
            RemoteBuild::Siso => Some(GeneratorFlag::SISO),
        }
    }
}

impl fmt::Display for RemoteBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemoteBuild {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(RemoteBuild::None),
            "reclient" => Ok(RemoteBuild::Reclient),
            "siso" => Ok(RemoteBuild::Siso),
            _ => Err(format!(
                "invalid remote build mode '{}'; expected one of: {}",
                s,
                RemoteBuild::VARIANTS.join(", ")
            )),
        }
    }
}

/// What to do when a resolved document fails schema validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Validation failures are fatal.
    #[default]
    Strict,
    /// Validation failures are reported and the document is used anyway.
    Warn,
    /// Validation is skipped.
    None,
}

impl ValidationPolicy {
    pub const VARIANTS: [&'static str; 3] = ["strict", "warn", "none"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationPolicy::Strict => "strict",
            ValidationPolicy::Warn => "warn",
            ValidationPolicy::None => "none",
        }
    }
}

impl fmt::Display for ValidationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(ValidationPolicy::Strict),
            "warn" => Ok(ValidationPolicy::Warn),
            "none" => Ok(ValidationPolicy::None),
            _ => Err(format!(
                "invalid validation level '{}'; expected 'strict', 'warn', or 'none'",
                s
            )),
        }
    }
}
