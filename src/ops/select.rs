//! Creating, selecting, listing, and removing configurations.

use std::path::PathBuf;

use anyhow::{bail, Result};
use serde_json::{json, Map, Value};

use crate::config::{ConfigError, ConfigSanitizer, ConfigStore};
use crate::core::document::keys;
use crate::core::{RemoteBuild, ValidationPolicy};
use crate::util::context::Session;

/// Output directory used when `init` isn't given one.
pub const DEFAULT_OUT_DIR: &str = "Testing";

/// Generator import used when `init` isn't given any arguments.
pub const DEFAULT_GEN_IMPORT: &str = "import(\"//electron/build/args/testing.gn\")";

/// Options for creating a configuration.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Configuration name
    pub name: String,

    /// Root of the source tree; required unless `extends` is set
    pub root: Option<PathBuf>,

    /// Output directory name
    pub out: Option<String>,

    /// Remote-execution backend
    pub remote_build: Option<RemoteBuild>,

    /// Generator arguments
    pub args: Vec<String>,

    /// Parent configuration
    pub extends: Option<String>,

    /// Overwrite an existing configuration
    pub force: bool,
}

/// What `init_config` did.
#[derive(Debug, Clone)]
pub struct InitResult {
    pub path: PathBuf,
    pub pointer: PathBuf,
}

/// Create a configuration and make it current.
///
/// A standalone configuration is written fully sanitized and must pass
/// strict validation. A configuration that extends another only records the
/// fields given here; the rest comes from its parent at load time.
pub fn init_config(session: &mut Session, opts: &InitOptions) -> Result<InitResult> {
    let store = session.store();
    ConfigStore::validate_name(&opts.name)?;

    if !opts.force {
        if let Some((path, _)) = store.locate(&opts.name)? {
            return Err(ConfigError::AlreadyExists {
                name: opts.name.clone(),
                path,
            }
            .into());
        }
    }

    let document = match opts.extends {
        Some(ref parent) => {
            if !store.exists(parent)? {
                return Err(ConfigError::NotFound {
                    name: parent.clone(),
                    dir: store.dir().to_path_buf(),
                    required_by: Some(opts.name.clone()),
                }
                .into());
            }
            child_document(parent, opts)
        }
        None => standalone_document(&opts.name, opts)?,
    };

    let path = store.save(&opts.name, &document)?;
    let pointer = session.select(&opts.name)?;
    tracing::info!("created configuration `{}` at {}", opts.name, path.display());

    Ok(InitResult { path, pointer })
}

fn standalone_document(name: &str, opts: &InitOptions) -> Result<Value> {
    let Some(ref root) = opts.root else {
        bail!("`--root` is required unless `--extends` is given");
    };
    let root = root.display().to_string();
    if root.is_empty() {
        bail!("`--root` must not be empty");
    }

    let args = if opts.args.is_empty() {
        vec![DEFAULT_GEN_IMPORT.to_string()]
    } else {
        opts.args.clone()
    };

    let draft = json!({
        "root": root,
        "remoteBuild": opts.remote_build.unwrap_or_default().as_str(),
        "gen": {
            "args": args,
            "out": opts.out.as_deref().unwrap_or(DEFAULT_OUT_DIR),
        },
        "env": {},
    });

    let outcome = ConfigSanitizer::default()
        .with_policy_override(Some(ValidationPolicy::Strict))
        .sanitize(draft);
    if !outcome.is_valid() {
        return Err(ConfigError::Validation {
            name: name.to_string(),
            issues: outcome.issues,
        }
        .into());
    }
    Ok(outcome.document)
}

fn child_document(parent: &str, opts: &InitOptions) -> Value {
    let mut map = Map::new();
    map.insert(keys::EXTENDS.to_string(), Value::String(parent.to_string()));

    if let Some(ref root) = opts.root {
        map.insert(keys::ROOT.to_string(), Value::String(root.display().to_string()));
    }
    if let Some(mode) = opts.remote_build {
        map.insert(keys::REMOTE_BUILD.to_string(), Value::String(mode.as_str().to_string()));
    }

    let mut gen = Map::new();
    if !opts.args.is_empty() {
        gen.insert(keys::GEN_ARGS.to_string(), json!(opts.args));
    }
    if let Some(ref out) = opts.out {
        gen.insert(keys::GEN_OUT.to_string(), Value::String(out.clone()));
    }
    if !gen.is_empty() {
        map.insert(keys::GEN.to_string(), Value::Object(gen));
    }

    Value::Object(map)
}

/// Make an existing configuration current.
pub fn use_config(session: &mut Session, name: &str) -> Result<PathBuf, ConfigError> {
    let store = session.store();
    if !store.exists(name)? {
        return Err(ConfigError::NotFound {
            name: name.to_string(),
            dir: store.dir().to_path_buf(),
            required_by: None,
        });
    }
    let pointer = session.select(name)?;
    tracing::info!("now using configuration `{}`", name);
    Ok(pointer)
}

/// One row of `berth list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSummary {
    pub name: String,
    pub current: bool,
}

/// Every stored configuration, sorted by name.
pub fn list_configs(session: &Session) -> Result<Vec<ConfigSummary>, ConfigError> {
    let names = session.store().list()?;
    Ok(names
        .into_iter()
        .map(|name| ConfigSummary {
            current: session.current() == Some(name.as_str()),
            name,
        })
        .collect())
}

/// Delete a configuration.
///
/// Pointer files are left alone even when they name the removed
/// configuration.
pub fn remove_config(session: &Session, name: &str) -> Result<PathBuf, ConfigError> {
    let path = session.store().remove(name)?;
    if session.current() == Some(name) {
        tracing::warn!(
            "`{}` was the current configuration; select another with `berth use`",
            name
        );
    }
    Ok(path)
}
