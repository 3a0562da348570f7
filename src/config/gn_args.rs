//! Helpers for generator (GN) argument strings.
//!
//! Arguments are stored as raw `name = value` lines. Only the variable name
//! is interpreted here; values are left alone.

use std::sync::LazyLock;

use regex::Regex;

static ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=").expect("valid regex"));

/// The variable an argument assigns, or `None` for imports and other
/// non-assignment lines.
pub fn arg_key(arg: &str) -> Option<&str> {
    ASSIGNMENT
        .captures(arg)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Check if `arg` assigns the variable `key`.
pub fn assigns(arg: &str, key: &str) -> bool {
    arg_key(arg) == Some(key)
}
