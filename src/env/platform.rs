//! Host platform detection and the overrides each platform needs.

use std::collections::BTreeMap;
use std::fmt;

/// Operating system berth is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Other
        }
    }

    /// Variables that must be set when building on this platform.
    pub fn overrides(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        if let Platform::Windows = self {
            // Use the locally installed Visual Studio instead of the
            // Google-internal toolchain package.
            vars.insert("DEPOT_TOOLS_WIN_TOOLCHAIN".to_string(), "0".to_string());
        }
        vars
    }

    /// Separator between `PATH` entries.
    pub fn path_separator(&self) -> &'static str {
        match self {
            Platform::Windows => ";",
            _ => ":",
        }
    }

    /// Suffix of executable files.
    pub fn exe_suffix(&self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            _ => "",
        }
    }

    /// Spelling of `key` as it already appears in `vars`.
    ///
    /// Windows environments are case-insensitive, so an existing `Path` is
    /// the same variable as `PATH`.
    pub fn env_key<'a>(&self, vars: &'a BTreeMap<String, String>, key: &'a str) -> &'a str {
        match self {
            Platform::Windows => vars
                .keys()
                .find(|k| k.eq_ignore_ascii_case(key))
                .map(String::as_str)
                .unwrap_or(key),
            _ => key,
        }
    }

    /// Name of the `PATH` variable as it appears in `vars`.
    pub fn path_key<'a>(&self, vars: &'a BTreeMap<String, String>) -> &'a str {
        self.env_key(vars, "PATH")
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Other => "other",
        };
        f.write_str(s)
    }
}
