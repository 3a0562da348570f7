//! `berth sanitize` command
//!
//! Runs migrations and derivations on a configuration and reports what
//! changed. Nothing is written without `--save`.

use anyhow::Result;

use super::load_named;
use crate::cli::SanitizeArgs;
use crate::GlobalOptions;
use berth::ops::LoadOptions;
use berth::util::{Session, Status};

pub fn execute(args: SanitizeArgs, session: &Session, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let opts = LoadOptions {
        save: args.save,
        quiet_changes: true,
    };

    let loaded = load_named(session, args.name.as_deref(), &opts)?;
    let name = loaded.config.name();

    if loaded.changes.is_empty() {
        shell.status(
            Status::Fresh,
            format!("`{}` is up to date ({})", name, loaded.version),
        );
        return Ok(());
    }

    for change in &loaded.changes {
        shell.status(Status::Updated, change);
    }

    match &loaded.saved_to {
        Some(path) => shell.status(Status::Saved, format!("`{}` ({})", name, path.display())),
        None => shell.note("run with `--save` to write these changes"),
    }

    Ok(())
}
