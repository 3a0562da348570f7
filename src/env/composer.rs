//! Layered composition of the build environment.
//!
//! Layers, lowest precedence first:
//!
//! 1. base: the process environment plus build-tool defaults
//! 2. platform overrides, for the running OS only
//! 3. the configuration's own `env` map
//! 4. the remote-execution backend's variables
//!
//! A later layer replaces any key set by an earlier one. The composed result
//! remembers which layer each variable came from.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::core::{RemoteBuild, ResolvedConfig};
use crate::env::credentials::{CredentialBridge, CredentialError};
use crate::env::platform::Platform;

/// Where an environment layer came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSource {
    Base,
    Platform(Platform),
    Config(String),
    RemoteExec(RemoteBuild),
}

impl fmt::Display for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerSource::Base => write!(f, "base"),
            LayerSource::Platform(p) => write!(f, "platform ({})", p),
            LayerSource::Config(name) => write!(f, "config `{}`", name),
            LayerSource::RemoteExec(mode) => write!(f, "remote build ({})", mode),
        }
    }
}

/// One named set of variables.
#[derive(Debug, Clone)]
pub struct EnvLayer {
    pub source: LayerSource,
    pub vars: BTreeMap<String, String>,
}

impl EnvLayer {
    pub fn new(source: LayerSource, vars: BTreeMap<String, String>) -> Self {
        EnvLayer { source, vars }
    }
}

/// The final environment, with per-variable provenance.
#[derive(Debug, Clone, Default)]
pub struct ComposedEnv {
    vars: BTreeMap<String, String>,
    origins: BTreeMap<String, LayerSource>,
}

impl ComposedEnv {
    /// Apply `layers` in order.
    ///
    /// On platforms with case-insensitive variable names a later layer
    /// overwrites the earlier variable under its first spelling.
    pub fn from_layers(platform: Platform, layers: impl IntoIterator<Item = EnvLayer>) -> Self {
        let mut composed = ComposedEnv::default();
        for layer in layers {
            for (key, value) in layer.vars {
                let key = platform.env_key(&composed.vars, &key).to_string();
                composed.origins.insert(key.clone(), layer.source.clone());
                composed.vars.insert(key, value);
            }
        }
        composed
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// The layer that set `key`.
    pub fn origin(&self, key: &str) -> Option<&LayerSource> {
        self.origins.get(key)
    }

    /// Variables that didn't come from the base layer, with their source.
    pub fn explain(&self) -> Vec<(&str, &str, &LayerSource)> {
        self.vars
            .iter()
            .filter_map(|(key, value)| {
                let source = self.origin(key)?;
                (*source != LayerSource::Base).then_some((key.as_str(), value.as_str(), source))
            })
            .collect()
    }
}

/// Builds the environment for external build tools.
pub struct EnvironmentComposer<'a> {
    bridge: CredentialBridge<'a>,
    platform: Platform,
    process_env: BTreeMap<String, String>,
    depot_tools: Option<PathBuf>,
}

impl<'a> EnvironmentComposer<'a> {
    pub fn new(bridge: CredentialBridge<'a>, platform: Platform) -> Self {
        EnvironmentComposer {
            bridge,
            platform,
            process_env: BTreeMap::new(),
            depot_tools: None,
        }
    }

    /// The inherited process environment.
    pub fn with_process_env(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.process_env = vars.into_iter().collect();
        self
    }

    /// depot_tools checkout to put at the front of `PATH`.
    pub fn with_depot_tools(mut self, dir: Option<PathBuf>) -> Self {
        self.depot_tools = dir;
        self
    }

    /// Process environment plus build-tool defaults.
    pub fn base_layer(&self) -> EnvLayer {
        let mut vars = self.process_env.clone();

        if let Some(ref depot_tools) = self.depot_tools {
            let key = self.platform.path_key(&self.process_env).to_string();
            let path = match vars.get(&key) {
                Some(existing) if !existing.is_empty() => format!(
                    "{}{}{}",
                    depot_tools.display(),
                    self.platform.path_separator(),
                    existing
                ),
                _ => depot_tools.display().to_string(),
            };
            vars.insert(key, path);
        }
        vars.insert("DEPOT_TOOLS_METRICS".to_string(), "0".to_string());

        EnvLayer::new(LayerSource::Base, vars)
    }

    /// Every layer that applies to `config`, lowest precedence first.
    ///
    /// Runs the credential helper when remote execution is enabled.
    pub fn layers(&self, config: Option<&ResolvedConfig>) -> Result<Vec<EnvLayer>, CredentialError> {
        let mut layers = vec![
            self.base_layer(),
            EnvLayer::new(LayerSource::Platform(self.platform), self.platform.overrides()),
        ];

        if let Some(config) = config {
            layers.push(EnvLayer::new(
                LayerSource::Config(config.name().to_string()),
                config.env(),
            ));

            let mode = config.remote_build();
            if mode.is_enabled() {
                layers.push(EnvLayer::new(
                    LayerSource::RemoteExec(mode),
                    self.bridge.env_for(config)?,
                ));
            }
        }

        Ok(layers)
    }

    /// Compose the final environment for `config`, or the
    /// pre-configuration environment when `config` is `None`.
    pub fn compose(&self, config: Option<&ResolvedConfig>) -> Result<ComposedEnv, CredentialError> {
        let layers = self.layers(config)?;
        tracing::debug!("composing environment from {} layer(s)", layers.len());
        Ok(ComposedEnv::from_layers(self.platform, layers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockExecutor, MockProcessOutput};
    use crate::util::config::RemoteSettings;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn var<'a>(env: &'a ComposedEnv, key: &str) -> Option<&'a str> {
        env.vars().get(key).map(String::as_str)
    }

    fn process_env() -> Vec<(String, String)> {
        vec![
            ("PATH".to_string(), "/usr/bin".to_string()),
            ("HOME".to_string(), "/home/me".to_string()),
            ("CHROMIUM_BUILDTOOLS_PATH".to_string(), "/stale".to_string()),
        ]
    }

    fn config(mode: &str, helper: &str) -> ResolvedConfig {
        ResolvedConfig::new(
            "testing",
            json!({
                "root": "/src/electron",
                "remoteBuild": mode,
                "rbeHelperPath": helper,
                "env": {
                    "CHROMIUM_BUILDTOOLS_PATH": "/src/electron/src/buildtools",
                    "RBE_service": "from-config"
                }
            }),
        )
    }

    #[test]
    fn test_no_config() {
        let exec = MockExecutor::new();
        let bridge = CredentialBridge::new(&exec, RemoteSettings::default(), PathBuf::from("/nope"));
        let composer = EnvironmentComposer::new(bridge, Platform::Linux)
            .with_process_env(process_env())
            .with_depot_tools(Some(PathBuf::from("/opt/depot_tools")));

        let env = composer.compose(None).unwrap();

        assert_eq!(var(&env, "PATH"), Some("/opt/depot_tools:/usr/bin"));
        assert_eq!(var(&env, "DEPOT_TOOLS_METRICS"), Some("0"));
        assert_eq!(var(&env, "HOME"), Some("/home/me"));
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn test_disabled_never_runs_helper() {
        let exec = MockExecutor::new();
        let bridge = CredentialBridge::new(&exec, RemoteSettings::default(), PathBuf::from("/nope"));
        let composer = EnvironmentComposer::new(bridge, Platform::Linux).with_process_env(process_env());

        let env = composer.compose(Some(&config("none", "/nope"))).unwrap();

        assert!(exec.calls().is_empty());
        assert_eq!(var(&env, "CHROMIUM_BUILDTOOLS_PATH"), Some("/src/electron/src/buildtools"));
        assert_eq!(
            env.origin("CHROMIUM_BUILDTOOLS_PATH"),
            Some(&LayerSource::Config("testing".to_string()))
        );
        assert_eq!(var(&env, "RBE_service"), Some("from-config"));
    }

    #[test]
    fn test_remote_layer_wins() {
        let tmp = TempDir::new().unwrap();
        let helper = tmp.path().join("helper");
        fs::write(&helper, "").unwrap();

        let mut exec = MockExecutor::new();
        exec.expect_suffix(" flags", MockProcessOutput::success(r#"{"RBE_extra": "1"}"#));
        let bridge = CredentialBridge::new(&exec, RemoteSettings::default(), PathBuf::from("/nope"));
        let composer = EnvironmentComposer::new(bridge, Platform::Linux).with_process_env(process_env());

        let env = composer
            .compose(Some(&config("reclient", &helper.display().to_string())))
            .unwrap();

        assert_eq!(var(&env, "RBE_service"), Some("rbe.notgoma.com:443"));
        assert_eq!(var(&env, "RBE_extra"), Some("1"));
        assert_eq!(
            env.origin("RBE_extra"),
            Some(&LayerSource::RemoteExec(RemoteBuild::Reclient))
        );
        assert_eq!(exec.calls().len(), 1);
    }

    #[test]
    fn test_windows_layer() {
        let exec = MockExecutor::new();
        let bridge = CredentialBridge::new(&exec, RemoteSettings::default(), PathBuf::from("/nope"));
        let composer = EnvironmentComposer::new(bridge, Platform::Windows)
            .with_process_env(vec![("Path".to_string(), "C:\\Windows".to_string())])
            .with_depot_tools(Some(PathBuf::from("C:\\depot_tools")));

        let env = composer.compose(None).unwrap();

        assert_eq!(var(&env, "DEPOT_TOOLS_WIN_TOOLCHAIN"), Some("0"));
        assert_eq!(var(&env, "Path"), Some("C:\\depot_tools;C:\\Windows"));
        assert!(var(&env, "PATH").is_none());
    }

    #[test]
    fn test_windows_config_path_keeps_spelling() {
        let exec = MockExecutor::new();
        let bridge = CredentialBridge::new(&exec, RemoteSettings::default(), PathBuf::from("/nope"));
        let composer = EnvironmentComposer::new(bridge, Platform::Windows)
            .with_process_env(vec![("Path".to_string(), "C:\\Windows".to_string())]);
        let config = ResolvedConfig::new(
            "testing",
            json!({ "root": "C:\\src", "remoteBuild": "none", "env": { "PATH": "C:\\tools" } }),
        );

        let env = composer.compose(Some(&config)).unwrap();

        assert_eq!(var(&env, "Path"), Some("C:\\tools"));
        assert!(var(&env, "PATH").is_none());
        assert_eq!(env.vars().keys().filter(|k| k.eq_ignore_ascii_case("path")).count(), 1);
        assert_eq!(env.origin("Path"), Some(&LayerSource::Config("testing".to_string())));
    }

    #[test]
    fn test_explain_skips_base() {
        let env = ComposedEnv::from_layers(Platform::Linux, vec![
            EnvLayer::new(
                LayerSource::Base,
                BTreeMap::from([("A".to_string(), "1".to_string()), ("B".to_string(), "1".to_string())]),
            ),
            EnvLayer::new(
                LayerSource::Config("x".to_string()),
                BTreeMap::from([("B".to_string(), "2".to_string())]),
            ),
        ]);

        let explained = env.explain();
        assert_eq!(explained.len(), 1);
        assert_eq!(explained[0].0, "B");
        assert_eq!(explained[0].1, "2");
    }

    #[test]
    fn test_credential_failure_propagates() {
        let exec = MockExecutor::new();
        let bridge = CredentialBridge::new(&exec, RemoteSettings::default(), PathBuf::from("/nope"));
        let composer = EnvironmentComposer::new(bridge, Platform::Linux);

        let result = composer.compose(Some(&config("siso", "/definitely/missing/helper")));
        assert!(matches!(result, Err(CredentialError::HelperMissing { .. })));
    }
}
