//! Bridge to the remote-execution credential helper.
//!
//! The helper is an external executable with two verbs:
//!
//! - `<helper> status` exits 0 when the user is authenticated
//! - `<helper> flags` prints a JSON object of extra environment variables
//!
//! Anything else the helper does is opaque to berth. A failed or malformed
//! `flags` call is always fatal: a build started without credentials fails
//! much later with a far less helpful message.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use miette::Diagnostic as MietteDiagnostic;
use serde_json::Value;
use thiserror::Error;

use crate::core::{RemoteBuild, ResolvedConfig};
use crate::env::platform::Platform;
use crate::util::config::RemoteSettings;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::process::{find_executable, Executor, ProcessBuilder};

/// File name of the credential helper, without platform suffix.
pub const HELPER_NAME: &str = "electron-rbe-credential-helper";

/// Remote-execution service used when nothing else is configured.
pub const DEFAULT_SERVICE_ADDRESS: &str = "rbe.notgoma.com:443";

/// Remote-execution instance used when nothing else is configured.
pub const DEFAULT_INSTANCE: &str = "projects/rbe-electron-public/instances/default_instance";

/// Error talking to the credential helper.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum CredentialError {
    #[error("credential helper not found")]
    #[diagnostic(
        code(berth::rbe::helper_missing),
        help("Install the helper or point berth at it with `rbeHelperPath`")
    )]
    HelperMissing { searched: Vec<PathBuf> },

    #[error("credential helper command `{command}` failed")]
    #[diagnostic(
        code(berth::rbe::helper_failed),
        help("Run `berth auth` to check the helper and your login")
    )]
    HelperFailed {
        command: String,
        status: Option<i32>,
        output: String,
    },

    #[error("credential helper command `{command}` returned malformed output")]
    #[diagnostic(
        code(berth::rbe::malformed_output),
        help("The helper may be out of date; update it and try again")
    )]
    MalformedOutput { command: String, reason: String },

    #[error("not authenticated with the remote build service")]
    #[diagnostic(code(berth::rbe::not_authenticated))]
    NotAuthenticated {
        helper: PathBuf,
        output: String,
        #[help]
        login_hint: String,
    },
}

impl CredentialError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());

        match self {
            CredentialError::HelperMissing { searched } => {
                for path in searched {
                    diag = diag.with_context(format!("looked for {}", path.display()));
                }
                diag = diag.with_context(format!("looked for `{}` on PATH", HELPER_NAME));
            }
            CredentialError::HelperFailed { status, output, .. } => {
                diag = diag.with_context(match status {
                    Some(code) => format!("exit status {}", code),
                    None => "terminated without an exit status".to_string(),
                });
                if !output.is_empty() {
                    diag = diag.with_context(output.clone());
                }
            }
            CredentialError::MalformedOutput { reason, .. } => {
                diag = diag.with_context(reason.clone());
            }
            CredentialError::NotAuthenticated { output, .. } => {
                if !output.is_empty() {
                    diag = diag.with_context(output.clone());
                }
            }
        }

        if let Some(help) = MietteDiagnostic::help(self) {
            diag = diag.with_suggestion(help.to_string());
        }
        if let CredentialError::HelperMissing { .. } = self {
            diag = diag.with_suggestion(suggestions::HELPER_PATH);
        }
        diag
    }
}

/// Result of a successful `status` check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStatus {
    pub helper: PathBuf,
    /// Whatever the helper printed.
    pub message: String,
}

/// Produces the environment contributed by the active remote-execution
/// backend.
pub struct CredentialBridge<'a> {
    executor: &'a dyn Executor,
    settings: RemoteSettings,
    bundled_helper: PathBuf,
}

impl<'a> CredentialBridge<'a> {
    /// `bundled_helper` is where berth installs the helper itself; it is
    /// used when neither the configuration nor `settings` name one.
    pub fn new(executor: &'a dyn Executor, settings: RemoteSettings, bundled_helper: PathBuf) -> Self {
        CredentialBridge {
            executor,
            settings,
            bundled_helper,
        }
    }

    /// Default location of the bundled helper under `home`.
    pub fn bundled_helper_path(home: &Path, platform: Platform) -> PathBuf {
        home.join("third_party")
            .join("reclient")
            .join(format!("{}{}", HELPER_NAME, platform.exe_suffix()))
    }

    /// Find the helper executable.
    ///
    /// An explicit path (from the configuration, then from settings) is used
    /// as-is when it exists, or looked up on `PATH` when it is a bare name.
    /// Otherwise the bundled helper is tried, then `PATH`.
    pub fn locate_helper(&self, config: Option<&ResolvedConfig>) -> Result<PathBuf, CredentialError> {
        let explicit = config
            .and_then(ResolvedConfig::rbe_helper_path)
            .map(PathBuf::from)
            .or_else(|| self.settings.helper.clone());

        if let Some(path) = explicit {
            if path.is_file() {
                return Ok(path);
            }
            let bare = path.components().count() == 1;
            if let Some(found) = bare.then(|| find_executable(&path.to_string_lossy())).flatten() {
                return Ok(found);
            }
            return Err(CredentialError::HelperMissing {
                searched: vec![path],
            });
        }

        if self.bundled_helper.is_file() {
            return Ok(self.bundled_helper.clone());
        }
        find_executable(HELPER_NAME).ok_or_else(|| CredentialError::HelperMissing {
            searched: vec![self.bundled_helper.clone()],
        })
    }

    fn service_address<'c>(&'c self, config: &'c ResolvedConfig) -> &'c str {
        config
            .rbe_service_address()
            .or(self.settings.service_address.as_deref())
            .unwrap_or(DEFAULT_SERVICE_ADDRESS)
    }

    fn instance<'c>(&'c self, config: &'c ResolvedConfig) -> &'c str {
        config
            .rbe_instance()
            .or(self.settings.instance.as_deref())
            .unwrap_or(DEFAULT_INSTANCE)
    }

    /// Static keys for `mode`, before the helper's own flags are merged in.
    pub fn static_keys(
        &self,
        config: &ResolvedConfig,
        mode: RemoteBuild,
        helper: &Path,
    ) -> BTreeMap<String, String> {
        let service = self.service_address(config).to_string();
        let instance = self.instance(config);
        let helper = helper.display().to_string();

        let pairs: Vec<(&str, String)> = match mode {
            RemoteBuild::None => Vec::new(),
            RemoteBuild::Reclient => vec![
                ("RBE_service", service),
                ("RBE_instance", instance.to_string()),
                ("RBE_credentials_helper", helper),
                ("RBE_credentials_helper_args", "print".to_string()),
            ],
            RemoteBuild::Siso => vec![
                ("SISO_REAPI_ADDRESS", service),
                ("SISO_PROJECT", project_of(instance).to_string()),
                ("SISO_CREDENTIAL_HELPER", helper),
            ],
        };

        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    /// Environment contributed by the remote-execution backend of `config`.
    ///
    /// Returns an empty map, without running anything, when remote execution
    /// is disabled.
    pub fn env_for(&self, config: &ResolvedConfig) -> Result<BTreeMap<String, String>, CredentialError> {
        let mode = config.remote_build();
        if !mode.is_enabled() {
            return Ok(BTreeMap::new());
        }

        let helper = self.locate_helper(Some(config))?;
        let mut vars = self.static_keys(config, mode, &helper);

        let cmd = ProcessBuilder::new(&helper).arg("flags");
        let output = self.run(&cmd)?;
        if !output.success() {
            return Err(CredentialError::HelperFailed {
                command: cmd.display_command(),
                status: output.status,
                output: output.combined_output(),
            });
        }

        let flags = parse_flags(&output.stdout).map_err(|reason| CredentialError::MalformedOutput {
            command: cmd.display_command(),
            reason,
        })?;
        tracing::debug!("credential helper supplied {} variable(s)", flags.len());
        vars.extend(flags);
        Ok(vars)
    }

    /// Ask the helper whether the user is authenticated.
    pub fn check_auth(&self, config: Option<&ResolvedConfig>) -> Result<AuthStatus, CredentialError> {
        let helper = self.locate_helper(config)?;
        let cmd = ProcessBuilder::new(&helper).arg("status");
        let output = self.run(&cmd)?;

        if output.success() {
            Ok(AuthStatus {
                helper,
                message: output.combined_output(),
            })
        } else {
            let login_hint = format!("Run `{} login` to authenticate", helper.display());
            Err(CredentialError::NotAuthenticated {
                helper,
                output: output.combined_output(),
                login_hint,
            })
        }
    }

    fn run(&self, cmd: &ProcessBuilder) -> Result<crate::util::process::ProcessOutput, CredentialError> {
        self.executor
            .execute(cmd)
            .map_err(|e| CredentialError::HelperFailed {
                command: cmd.display_command(),
                status: None,
                output: format!("{:#}", e),
            })
    }
}

/// `projects/<project>/instances/<name>` → `<project>`.
fn project_of(instance: &str) -> &str {
    let mut parts = instance.split('/');
    match (parts.next(), parts.next()) {
        (Some("projects"), Some(project)) if !project.is_empty() => project,
        _ => instance,
    }
}

/// Parse the stdout of `<helper> flags`.
///
/// Must be a JSON object; string values are taken as-is, numbers and booleans
/// are stringified, nulls are skipped.
fn parse_flags(stdout: &str) -> Result<BTreeMap<String, String>, String> {
    let value: Value = serde_json::from_str(stdout.trim()).map_err(|e| e.to_string())?;
    let Value::Object(map) = value else {
        return Err(format!("expected a JSON object, found {}", stdout.trim()));
    };

    let mut vars = BTreeMap::new();
    for (key, value) in map {
        let value = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => continue,
            _ => return Err(format!("value of `{}` is not a scalar", key)),
        };
        vars.insert(key, value);
    }
    Ok(vars)
}
