//! Persistence of named configuration documents.
//!
//! Each configuration lives in `<dir>/<name>.<ext>`, where the extension
//! selects JSON or YAML. Both formats are read transparently; a name that
//! exists in two formats is rejected as ambiguous rather than silently
//! picking one.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::errors::ConfigError;
use crate::config::format::DocumentFormat;
use crate::util::fs::{remove_file_if_exists, write_atomic};

/// A document as read from disk, before any resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Configuration name
    pub name: String,
    /// File the document was read from
    pub path: PathBuf,
    /// Serialization of that file
    pub format: DocumentFormat,
    /// Parsed content
    pub document: Value,
}

/// Directory of named configuration documents.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
    preferred: DocumentFormat,
}

impl ConfigStore {
    /// Create a store rooted at `dir`, writing new documents as `preferred`.
    pub fn new(dir: impl Into<PathBuf>, preferred: DocumentFormat) -> Self {
        ConfigStore {
            dir: dir.into(),
            preferred,
        }
    }

    /// Directory holding the documents.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Check that `name` can be used as a file stem.
    pub fn validate_name(name: &str) -> Result<(), ConfigError> {
        let reason = if name.is_empty() {
            Some("name is empty")
        } else if name.starts_with('.') {
            Some("name starts with `.`")
        } else if name.contains(['/', '\\']) {
            Some("name contains a path separator")
        } else if name.chars().any(char::is_control) {
            Some("name contains control characters")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ConfigError::InvalidName {
                name: name.to_string(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn candidates(&self, name: &str) -> Vec<(PathBuf, DocumentFormat)> {
        let mut paths = Vec::new();
        for format in DocumentFormat::ALL {
            for ext in format.extensions() {
                paths.push((self.dir.join(format!("{}.{}", name, ext)), format));
            }
        }
        paths
    }

    /// Find the file backing `name`, if any.
    pub fn locate(&self, name: &str) -> Result<Option<(PathBuf, DocumentFormat)>, ConfigError> {
        Self::validate_name(name)?;

        let found: Vec<_> = self
            .candidates(name)
            .into_iter()
            .filter(|(p, _)| p.is_file())
            .collect();
        match found.len() {
            0 => Ok(None),
            1 => Ok(found.into_iter().next()),
            _ => Err(ConfigError::Ambiguous {
                name: name.to_string(),
                paths: found.into_iter().map(|(p, _)| p).collect(),
            }),
        }
    }

    /// Check if a document exists for `name`.
    pub fn exists(&self, name: &str) -> Result<bool, ConfigError> {
        Ok(self.locate(name)?.is_some())
    }

    /// Path a new document for `name` would be written to.
    pub fn path_for_new(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", name, self.preferred.preferred_extension()))
    }

    /// Read and parse the document for `name`.
    pub fn load(&self, name: &str) -> Result<StoredDocument, ConfigError> {
        let (path, format) = self.locate(name)?.ok_or_else(|| ConfigError::NotFound {
            name: name.to_string(),
            dir: self.dir.clone(),
            required_by: None,
        })?;

        tracing::debug!("loading configuration `{}` from {}", name, path.display());

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::io(&path, e))?;
        let document = format.parse(&content).map_err(|message| ConfigError::Parse {
            path: path.clone(),
            format,
            message,
        })?;

        Ok(StoredDocument {
            name: name.to_string(),
            path,
            format,
            document,
        })
    }

    /// Write `document` as `name`, keeping the format of an existing file.
    ///
    /// Returns the path written.
    pub fn save(&self, name: &str, document: &Value) -> Result<PathBuf, ConfigError> {
        let (path, format) = match self.locate(name)? {
            Some(existing) => existing,
            None => (self.path_for_new(name), self.preferred),
        };

        let persistence = |source: io::Error| ConfigError::Persistence {
            name: name.to_string(),
            path: path.clone(),
            source,
        };

        let text = format
            .render(document)
            .map_err(|msg| persistence(io::Error::new(io::ErrorKind::InvalidData, msg)))?;
        write_atomic(&path, text.as_bytes()).map_err(persistence)?;

        tracing::debug!("saved configuration `{}` to {}", name, path.display());
        Ok(path)
    }

    /// Names of every stored configuration, sorted.
    pub fn list(&self) -> Result<Vec<String>, ConfigError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ConfigError::io(&self.dir, e)),
        };

        let mut names = BTreeSet::new();
        for entry in entries {
            let path = entry.map_err(|e| ConfigError::io(&self.dir, e))?.path();
            if !path.is_file() || DocumentFormat::from_path(&path).is_none() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if Self::validate_name(stem).is_ok() {
                    names.insert(stem.to_string());
                }
            }
        }

        Ok(names.into_iter().collect())
    }

    /// Delete the document for `name`. Returns the path removed.
    pub fn remove(&self, name: &str) -> Result<PathBuf, ConfigError> {
        let (path, _) = self.locate(name)?.ok_or_else(|| ConfigError::NotFound {
            name: name.to_string(),
            dir: self.dir.clone(),
            required_by: None,
        })?;

        remove_file_if_exists(&path).map_err(|e| ConfigError::io(&path, e))?;
        tracing::debug!("removed configuration `{}` ({})", name, path.display());
        Ok(path)
    }
}
