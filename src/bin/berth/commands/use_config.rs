//! `berth use` command

use anyhow::Result;

use crate::cli::UseArgs;
use crate::GlobalOptions;
use berth::ops::use_config;
use berth::util::{Session, Status};

pub fn execute(args: UseArgs, session: &mut Session, global_opts: &GlobalOptions) -> Result<()> {
    let pointer = use_config(session, &args.name)?;

    global_opts.shell.status(
        Status::Using,
        format!("`{}` ({})", args.name, pointer.display()),
    );

    Ok(())
}
