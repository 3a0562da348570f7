//! High-level operations.
//!
//! This module contains the implementation of berth commands.

pub mod env;
pub mod load;
pub mod select;

pub use env::{check_auth, compose_env};
pub use load::{load_config, load_current, LoadOptions, LoadedConfig};
pub use select::{
    init_config, list_configs, remove_config, use_config, ConfigSummary, InitOptions, InitResult,
};
