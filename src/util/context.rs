//! Per-invocation session state.
//!
//! Everything berth learns from its surroundings (home directory, settings,
//! the current configuration, the process environment) is read once by
//! [`Session::from_env`] and then passed explicitly to the operations that
//! need it.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};

use crate::config::current::{resolve_current_name, CurrentPointer, ENV_CURRENT, ENV_CURRENT_FILE};
use crate::config::{ConfigError, ConfigStore};
use crate::core::ValidationPolicy;
use crate::env::{CredentialBridge, Platform};
use crate::util::config::{global_settings_path, load_settings, project_settings_path, Settings};

/// Environment variable overriding the berth home directory.
pub const ENV_HOME: &str = "BERTH_HOME";

/// Project directories for berth
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("com", "berth", "berth"));

/// State shared by every operation of one berth invocation.
#[derive(Debug)]
pub struct Session {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for berth data (configs, pointer file, bundled tools)
    home: PathBuf,

    /// Merged settings, environment overrides applied
    settings: Settings,

    /// Current-configuration pointer files, in lookup order
    pointer: CurrentPointer,

    /// Name of the current configuration, if any
    current: Option<String>,

    /// Validation level forced from the command line
    cli_validation: Option<ValidationPolicy>,

    /// Process environment at startup
    process_env: BTreeMap<String, String>,

    platform: Platform,
    quiet: bool,
    color: bool,

    /// Set once automatic changes have been reported
    warned_changes: Cell<bool>,
}

impl Session {
    /// Build a session from the real process environment.
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let env: BTreeMap<String, String> = std::env::vars().collect();
        Self::new(cwd, env)
    }

    /// Build a session from an explicit working directory and environment.
    pub fn new(cwd: PathBuf, env: BTreeMap<String, String>) -> Result<Self> {
        let home = resolve_home(&env)?;

        let mut settings = load_settings(&global_settings_path(&home), &project_settings_path(&cwd));
        settings.apply_env(|key| env.get(key).cloned());

        let extra_pointer = env
            .get(ENV_CURRENT_FILE)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        let pointer = CurrentPointer::for_home(&home, extra_pointer);
        let current = resolve_current_name(env.get(ENV_CURRENT).cloned(), &pointer)?;

        tracing::debug!("berth home: {}", home.display());

        Ok(Session {
            cwd,
            home,
            settings,
            pointer,
            current,
            cli_validation: None,
            process_env: env,
            platform: Platform::current(),
            quiet: false,
            color: true,
            warned_changes: Cell::new(false),
        })
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Directory holding the named configurations.
    pub fn configs_dir(&self) -> PathBuf {
        self.home.join("configs")
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn process_env(&self) -> &BTreeMap<String, String> {
        &self.process_env
    }

    /// The configuration store for this session.
    pub fn store(&self) -> ConfigStore {
        ConfigStore::new(self.configs_dir(), self.settings.document_format())
    }

    /// Name of the current configuration, if one is selected.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Name of the current configuration, or [`ConfigError::NoCurrent`].
    pub fn require_current(&self) -> Result<&str, ConfigError> {
        self.current().ok_or(ConfigError::NoCurrent)
    }

    /// Make `name` the current configuration.
    pub fn select(&mut self, name: &str) -> Result<PathBuf, ConfigError> {
        let file = self.pointer.write(name)?;
        self.current = Some(name.to_string());
        Ok(file)
    }

    /// Force a validation level for this invocation.
    pub fn set_validation_override(&mut self, policy: Option<ValidationPolicy>) {
        self.cli_validation = policy;
    }

    /// Validation level that replaces each document's own, if any.
    ///
    /// The command line wins over `BERTH_VALIDATION_LEVEL` and settings.
    pub fn validation_override(&self) -> Option<ValidationPolicy> {
        self.cli_validation
            .or_else(|| self.settings.validation_override())
    }

    /// depot_tools checkout placed at the front of `PATH`.
    pub fn depot_tools_dir(&self) -> PathBuf {
        self.settings
            .paths
            .depot_tools
            .clone()
            .unwrap_or_else(|| self.home.join("third_party").join("depot_tools"))
    }

    /// Where the bundled credential helper lives.
    pub fn bundled_helper_path(&self) -> PathBuf {
        CredentialBridge::bundled_helper_path(&self.home, self.platform)
    }

    /// Returns `true` the first time it is called, `false` after.
    ///
    /// Used to report automatic changes once per invocation.
    pub fn take_change_warning(&self) -> bool {
        !self.warned_changes.replace(true)
    }

    /// Suppress warnings printed on the user's behalf.
    pub fn set_quiet(&mut self, quiet: bool) {
        self.quiet = quiet;
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Set color output.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Check if color output is enabled.
    pub fn color(&self) -> bool {
        self.color
    }
}

fn resolve_home(env: &BTreeMap<String, String>) -> Result<PathBuf> {
    if let Some(home) = env.get(ENV_HOME).filter(|h| !h.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    if let Some(dirs) = PROJECT_DIRS.as_ref() {
        return Ok(dirs.data_dir().to_path_buf());
    }
    BaseDirs::new()
        .map(|b| b.home_dir().join(".berth"))
        .with_context(|| format!("could not determine a home directory; set {}", ENV_HOME))
}
