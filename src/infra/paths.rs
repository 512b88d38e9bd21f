// src/infra/paths.rs — Config location
//
// TOXAMP_HOME overrides everything; otherwise config lives in ~/.toxamp/.

use std::path::PathBuf;

fn toxamp_home() -> Option<PathBuf> {
    std::env::var_os("TOXAMP_HOME").map(PathBuf::from)
}

/// Configuration directory: $TOXAMP_HOME/ or ~/.toxamp/
pub fn config_dir() -> PathBuf {
    if let Some(home) = toxamp_home() {
        return home;
    }
    match directories::BaseDirs::new() {
        Some(base) => base.home_dir().join(".toxamp"),
        // No resolvable home (some containers); fall back to the working directory.
        None => PathBuf::from(".toxamp"),
    }
}

pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}
