// Author: Dustin Pilgrim
// License: MIT

use std::path::PathBuf;

pub mod parser;

pub use parser::{ConfigParseError, load_config, parse_tracker_config};

/// Built-in configuration, used when no file is found.
pub const DEFAULT_CONFIG: &str = include_str!("default.rune");

pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|mut p| {
        p.push(".config/petrack/petrack.rune");
        p
    })
}

pub fn system_config_path() -> PathBuf {
    PathBuf::from("/etc/petrack/petrack.rune")
}

/// First existing config file: user, then system.
pub fn get_config_path() -> Option<PathBuf> {
    if let Some(path) = user_config_path() {
        if path.exists() {
            return Some(path);
        }
    }

    let system_path = system_config_path();
    if system_path.exists() {
        return Some(system_path);
    }

    None
}
