//! Building the environment for external tools.

use crate::core::ResolvedConfig;
use crate::env::{AuthStatus, ComposedEnv, CredentialBridge, CredentialError, EnvironmentComposer};
use crate::util::context::Session;
use crate::util::process::Executor;

fn bridge<'a>(session: &Session, executor: &'a dyn Executor) -> CredentialBridge<'a> {
    CredentialBridge::new(
        executor,
        session.settings().remote.clone(),
        session.bundled_helper_path(),
    )
}

/// Compose the environment for `config`, or the pre-configuration
/// environment when there is none.
pub fn compose_env(
    session: &Session,
    config: Option<&ResolvedConfig>,
    executor: &dyn Executor,
) -> Result<ComposedEnv, CredentialError> {
    EnvironmentComposer::new(bridge(session, executor), session.platform())
        .with_process_env(session.process_env().clone())
        .with_depot_tools(Some(session.depot_tools_dir()))
        .compose(config)
}

/// Check that the user is authenticated with the remote build service.
pub fn check_auth(
    session: &Session,
    config: Option<&ResolvedConfig>,
    executor: &dyn Executor,
) -> Result<AuthStatus, CredentialError> {
    bridge(session, executor).check_auth(config)
}
