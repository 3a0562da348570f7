//! `berth remove` command

use anyhow::Result;

use crate::cli::RemoveArgs;
use crate::GlobalOptions;
use berth::ops::remove_config;
use berth::util::{Session, Status};

pub fn execute(args: RemoveArgs, session: &Session, global_opts: &GlobalOptions) -> Result<()> {
    let path = remove_config(session, &args.name)?;

    global_opts.shell.status(
        Status::Removed,
        format!("configuration `{}` ({})", args.name, path.display()),
    );

    Ok(())
}
