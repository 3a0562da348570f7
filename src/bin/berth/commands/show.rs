//! `berth show` command
//!
//! Prints a summary of the resolved, sanitized configuration, or the whole
//! document with `--json`.

use anyhow::{Context, Result};

use super::load_named;
use crate::cli::ShowArgs;
use berth::core::ResolvedConfig;
use berth::ops::LoadOptions;
use berth::util::Session;

pub fn execute(args: ShowArgs, session: &Session) -> Result<()> {
    let loaded = load_named(session, args.name.as_deref(), &LoadOptions::default())?;

    if args.json {
        let rendered = serde_json::to_string_pretty(loaded.config.document())
            .context("failed to serialize configuration")?;
        println!("{}", rendered);
    } else {
        print!("{}", summary(&loaded.config));
    }

    Ok(())
}

fn summary(config: &ResolvedConfig) -> String {
    let mut out = format!("name: {}\n", config.name());
    out.push_str(&format!("root: {}\n", config.root().unwrap_or("-")));
    out.push_str(&format!("out: {}\n", config.out_dir().unwrap_or("-")));
    out.push_str(&format!("remote build: {}\n", config.remote_build()));

    let gen_args = config.gen_args();
    if !gen_args.is_empty() {
        out.push_str("gen args:\n");
        for arg in gen_args {
            out.push_str(&format!("  {}\n", arg));
        }
    }

    let remotes = config.remotes();
    if !remotes.is_empty() {
        out.push_str("remotes:\n");
        for (name, remote) in &remotes {
            match remote.fork {
                Some(ref fork) => {
                    out.push_str(&format!("  {} {} (fork {})\n", name, remote.origin, fork))
                }
                None => out.push_str(&format!("  {} {}\n", name, remote.origin)),
            }
        }
    }

    out
}
