//! Settings file support for berth itself.
//!
//! berth reads its own settings from two locations:
//! - Global: `<home>/settings.toml` - User-wide defaults
//! - Project: `.berth/settings.toml` - Overrides for the current directory
//!
//! Project settings take precedence over global settings, and `BERTH_*`
//! environment variables take precedence over both. These settings tune the
//! tool; they are unrelated to the named build configurations it manages.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::format::DocumentFormat;
use crate::core::ValidationPolicy;

/// Environment variable selecting the format of newly created documents.
pub const ENV_CONFIG_FORMAT: &str = "BERTH_CONFIG_FORMAT";

/// Environment variable overriding every document's validation level.
pub const ENV_VALIDATION_LEVEL: &str = "BERTH_VALIDATION_LEVEL";

/// Environment variable pointing at the credential helper.
pub const ENV_RBE_HELPER: &str = "BERTH_RBE_HELPER";

/// Environment variable pointing at a depot_tools checkout.
pub const ENV_DEPOT_TOOLS: &str = "BERTH_DEPOT_TOOLS";

/// berth settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Configuration store settings
    pub store: StoreSettings,

    /// Validation settings
    pub validation: ValidationSettings,

    /// Tool locations
    pub paths: PathSettings,

    /// Remote-execution defaults
    pub remote: RemoteSettings,
}

/// Configuration store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Format for new documents (json, yaml)
    pub format: Option<String>,
}

/// Validation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Level applied to every document, overriding `configValidationLevel`
    pub level: Option<String>,
}

/// Tool locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// depot_tools checkout prepended to PATH
    pub depot_tools: Option<PathBuf>,
}

/// Remote-execution defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Credential helper executable
    pub helper: Option<PathBuf>,

    /// Service address used when a configuration doesn't set one
    pub service_address: Option<String>,

    /// Project/instance used when a configuration doesn't set one
    pub instance: Option<String>,
}

impl Settings {
    /// Load settings from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse settings file: {}", path.display()))
    }

    /// Load settings with fallback to defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load settings from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge other settings into these (other takes precedence).
    pub fn merge(&mut self, other: Settings) {
        if other.store.format.is_some() {
            self.store.format = other.store.format;
        }
        if other.validation.level.is_some() {
            self.validation.level = other.validation.level;
        }
        if other.paths.depot_tools.is_some() {
            self.paths.depot_tools = other.paths.depot_tools;
        }
        if other.remote.helper.is_some() {
            self.remote.helper = other.remote.helper;
        }
        if other.remote.service_address.is_some() {
            self.remote.service_address = other.remote.service_address;
        }
        if other.remote.instance.is_some() {
            self.remote.instance = other.remote.instance;
        }
    }

    /// Apply `BERTH_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(format) = lookup(ENV_CONFIG_FORMAT) {
            self.store.format = Some(format);
        }
        if let Some(level) = lookup(ENV_VALIDATION_LEVEL) {
            self.validation.level = Some(level);
        }
        if let Some(helper) = lookup(ENV_RBE_HELPER) {
            self.remote.helper = Some(PathBuf::from(helper));
        }
        if let Some(depot_tools) = lookup(ENV_DEPOT_TOOLS) {
            self.paths.depot_tools = Some(PathBuf::from(depot_tools));
        }
    }

    /// Format for newly created documents. Unknown values fall back to JSON.
    pub fn document_format(&self) -> DocumentFormat {
        match self.store.format.as_deref() {
            None => DocumentFormat::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("{}; using json", e);
                DocumentFormat::default()
            }),
        }
    }

    /// Validation level forced on every document, if configured.
    pub fn validation_override(&self) -> Option<ValidationPolicy> {
        self.validation.level.as_deref().and_then(|raw| match raw.parse() {
            Ok(policy) => Some(policy),
            Err(e) => {
                tracing::warn!("{}; ignoring validation override", e);
                None
            }
        })
    }
}

/// Get the global settings path (`<home>/settings.toml`).
pub fn global_settings_path(home: &Path) -> PathBuf {
    home.join("settings.toml")
}

/// Get the project settings path (`.berth/settings.toml`).
pub fn project_settings_path(project_root: &Path) -> PathBuf {
    project_root.join(".berth").join("settings.toml")
}

/// Load merged settings from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project settings (.berth/settings.toml)
/// 2. Global settings (<home>/settings.toml)
/// 3. Defaults
pub fn load_settings(global_path: &Path, project_path: &Path) -> Settings {
    let mut settings = Settings::default();

    if global_path.exists() {
        settings.merge(Settings::load_or_default(global_path));
    }

    if project_path.exists() {
        settings.merge(Settings::load_or_default(project_path));
    }

    settings
}
