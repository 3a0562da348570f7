//! `berth init` command

use anyhow::Result;

use crate::cli::InitArgs;
use crate::GlobalOptions;
use berth::ops::{init_config, InitOptions};
use berth::util::{Session, Status};

pub fn execute(args: InitArgs, session: &mut Session, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;

    let opts = InitOptions {
        name: args.name,
        root: args.root.map(|root| session.cwd().join(root)),
        out: args.out,
        remote_build: args.remote_build,
        args: args.args,
        extends: args.extends,
        force: args.force,
    };

    let result = init_config(session, &opts)?;

    shell.status(
        Status::Created,
        format!("configuration `{}` ({})", opts.name, result.path.display()),
    );
    shell.status(Status::Using, format!("`{}`", opts.name));

    Ok(())
}
