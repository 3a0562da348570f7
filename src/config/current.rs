//! The "current configuration" pointer files.
//!
//! A pointer file holds one configuration name and a trailing newline.
//! Several pointer files can be consulted; the first one that exists and is
//! non-empty wins. Selecting a configuration rewrites the first file in the
//! list. Pointer files are never deleted by berth.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::errors::ConfigError;
use crate::config::store::ConfigStore;
use crate::util::fs::write_atomic;

/// Environment variable naming the current configuration directly.
pub const ENV_CURRENT: &str = "BERTH_CURRENT";

/// Environment variable naming an extra pointer file, checked first.
pub const ENV_CURRENT_FILE: &str = "BERTH_CURRENT_FILE";

/// Default pointer file name inside the berth home.
pub const CURRENT_FILE_NAME: &str = "current";

/// Ordered list of pointer files. There is always at least one.
#[derive(Debug, Clone)]
pub struct CurrentPointer {
    /// File that selections are written to, checked first.
    primary: PathBuf,
    fallbacks: Vec<PathBuf>,
}

impl CurrentPointer {
    /// The default pointer file in `home`, preceded by `extra` when given.
    pub fn for_home(home: &Path, extra: Option<PathBuf>) -> Self {
        let default = home.join(CURRENT_FILE_NAME);
        match extra {
            Some(primary) => CurrentPointer {
                primary,
                fallbacks: vec![default],
            },
            None => CurrentPointer {
                primary: default,
                fallbacks: Vec::new(),
            },
        }
    }

    /// Pointer files in lookup order.
    fn files(&self) -> impl Iterator<Item = &PathBuf> {
        std::iter::once(&self.primary).chain(&self.fallbacks)
    }

    /// Name recorded in the first existing, non-empty pointer file.
    pub fn read(&self) -> Result<Option<String>, ConfigError> {
        for file in self.files() {
            let content = match fs::read_to_string(file) {
                Ok(content) => content,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(ConfigError::io(file, e)),
            };
            let name = content.trim();
            if !name.is_empty() {
                tracing::debug!("current configuration `{}` from {}", name, file.display());
                return Ok(Some(name.to_string()));
            }
        }
        Ok(None)
    }

    /// Record `name` as current in the first pointer file.
    pub fn write(&self, name: &str) -> Result<PathBuf, ConfigError> {
        ConfigStore::validate_name(name)?;

        let file = &self.primary;
        write_atomic(file, format!("{}\n", name).as_bytes()).map_err(|source| {
            ConfigError::Persistence {
                name: name.to_string(),
                path: file.clone(),
                source,
            }
        })?;
        Ok(file.clone())
    }
}

/// Determine the current configuration name.
///
/// `env_name` (the value of [`ENV_CURRENT`]) short-circuits the pointer files
/// entirely. Empty values are ignored.
pub fn resolve_current_name(
    env_name: Option<String>,
    pointer: &CurrentPointer,
) -> Result<Option<String>, ConfigError> {
    if let Some(name) = env_name.map(|n| n.trim().to_string()) {
        if !name.is_empty() {
            tracing::debug!("current configuration `{}` from {}", name, ENV_CURRENT);
            return Ok(Some(name));
        }
    }
    pointer.read()
}
