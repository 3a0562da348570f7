//! `berth env` command
//!
//! Without a current configuration the pre-configuration environment is
//! printed, so the command is usable right after installation.

use anyhow::Result;

use super::load_named;
use crate::cli::EnvArgs;
use berth::ops::{compose_env, LoadOptions};
use berth::util::process::SystemExecutor;
use berth::util::Session;

pub fn execute(args: EnvArgs, session: &Session) -> Result<()> {
    let loaded = if args.name.is_some() || session.current().is_some() {
        Some(load_named(session, args.name.as_deref(), &LoadOptions::default())?)
    } else {
        tracing::debug!("no configuration selected; composing base environment");
        None
    };
    let config = loaded.as_ref().map(|l| &l.config);

    let env = compose_env(session, config, &SystemExecutor)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(env.vars())?);
    } else if args.explain {
        for (key, value, source) in env.explain() {
            println!("{}={}  # {}", key, value, source);
        }
    } else {
        for (key, value) in env.vars() {
            println!("{}={}", key, value);
        }
    }

    Ok(())
}
