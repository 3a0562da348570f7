//! `berth schema` command

use anyhow::Result;

use berth::config::config_schema;

pub fn execute() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&config_schema())?);
    Ok(())
}
