//! `berth auth` command

use anyhow::Result;

use super::load_named;
use crate::cli::AuthArgs;
use crate::GlobalOptions;
use berth::ops::{check_auth, LoadOptions};
use berth::util::process::SystemExecutor;
use berth::util::{Session, Status};

pub fn execute(args: AuthArgs, session: &Session, global_opts: &GlobalOptions) -> Result<()> {
    let loaded = if args.name.is_some() || session.current().is_some() {
        Some(load_named(session, args.name.as_deref(), &LoadOptions::default())?)
    } else {
        None
    };

    if let Some(loaded) = &loaded {
        if !loaded.config.remote_build().is_enabled() {
            global_opts.shell.warn(format!(
                "`{}` builds locally; checking credentials anyway",
                loaded.config.name()
            ));
        }
    }

    let status = check_auth(session, loaded.as_ref().map(|l| &l.config), &SystemExecutor)?;

    global_opts
        .shell
        .status(Status::Authenticated, status.helper.display());
    let message = status.message.trim();
    if !message.is_empty() {
        global_opts.shell.note(message);
    }

    Ok(())
}
