//! Command implementations

pub mod auth;
pub mod completions;
pub mod env;
pub mod init;
pub mod list;
pub mod remove;
pub mod sanitize;
pub mod schema;
pub mod show;
pub mod use_config;

use anyhow::Result;

use berth::ops::{load_config, load_current, LoadOptions, LoadedConfig};
use berth::util::Session;

/// Load `name`, or the current configuration when no name is given.
pub(crate) fn load_named(
    session: &Session,
    name: Option<&str>,
    opts: &LoadOptions,
) -> Result<LoadedConfig> {
    let loaded = match name {
        Some(name) => load_config(session, name, opts)?,
        None => load_current(session, opts)?,
    };
    Ok(loaded)
}
