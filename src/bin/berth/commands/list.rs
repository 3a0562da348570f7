//! `berth list` command

use anyhow::Result;
use serde_json::json;

use crate::cli::ListArgs;
use crate::GlobalOptions;
use berth::ops::list_configs;
use berth::util::Session;

pub fn execute(args: ListArgs, session: &Session, global_opts: &GlobalOptions) -> Result<()> {
    let configs = list_configs(session)?;

    if args.json {
        let rows: Vec<_> = configs
            .iter()
            .map(|c| json!({ "name": c.name, "current": c.current }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if configs.is_empty() {
        global_opts
            .shell
            .note(format!("no configurations in {}", session.configs_dir().display()));
        return Ok(());
    }

    for config in &configs {
        let marker = if config.current { "*" } else { " " };
        println!("{} {}", marker, config.name);
    }

    Ok(())
}
