// Author: Dustin Pilgrim
// License: MIT

use std::fmt;
use std::io;
use std::path::Path;

use rune_cfg::RuneConfig;

use crate::{
    config::{DEFAULT_CONFIG, get_config_path},
    core::{
        config::{
            DEFAULT_IDLE_THRESHOLD_SECONDS, DEFAULT_IDLE_WARNING_SECONDS,
            DEFAULT_MINIMUM_VIEW_SECONDS, TrackerConfig,
        },
        mode::TimerMode,
    },
    pdebug,
};

#[derive(Debug)]
pub enum ConfigParseError {
    RuneConfig(String),
    Io(io::Error),
    InvalidValue { key: &'static str, reason: String },
}

impl fmt::Display for ConfigParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigParseError::RuneConfig(msg) => write!(f, "Configuration error: {}", msg),
            ConfigParseError::Io(e) => write!(f, "IO error: {}", e),
            ConfigParseError::InvalidValue { key, reason } => {
                write!(f, "Invalid value for tracker.{}: {}", key, reason)
            }
        }
    }
}

impl std::error::Error for ConfigParseError {}

impl From<io::Error> for ConfigParseError {
    fn from(err: io::Error) -> Self {
        ConfigParseError::Io(err)
    }
}

/// Loads the tracker configuration.
///
/// An explicit path must exist. Otherwise the user config, then the system
/// config, then the built-in default is used.
pub fn load_config(explicit: Option<&Path>) -> Result<TrackerConfig, ConfigParseError> {
    let config = load_rune_config(explicit)?;
    parse_tracker_config(&config)
}

fn load_rune_config(explicit: Option<&Path>) -> Result<RuneConfig, ConfigParseError> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigParseError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("config file {} does not exist", path.display()),
            )));
        }
        return from_file(path);
    }

    match get_config_path() {
        Some(path) => from_file(&path),
        None => {
            pdebug!("Config", "Using internal default configuration");
            RuneConfig::from_str(DEFAULT_CONFIG).map_err(|e| {
                ConfigParseError::RuneConfig(format!(
                    "failed to parse internal default config: {}",
                    e
                ))
            })
        }
    }
}

fn from_file(path: &Path) -> Result<RuneConfig, ConfigParseError> {
    let config = RuneConfig::from_file(path).map_err(|e| {
        ConfigParseError::RuneConfig(format!(
            "failed to load config from {}: {}",
            path.display(),
            e
        ))
    })?;
    pdebug!("Config", "Loaded config from: {}", path.display());
    Ok(config)
}

/// Reads the `tracker:` block. Keys accept both `_` and `-` spellings;
/// missing keys take their defaults.
pub fn parse_tracker_config(config: &RuneConfig) -> Result<TrackerConfig, ConfigParseError> {
    let timer_mode = match config
        .get::<String>("tracker.timer_mode")
        .or_else(|_| config.get::<String>("tracker.timer-mode"))
    {
        Ok(raw) => Some(raw.parse::<TimerMode>().map_err(|e| {
            ConfigParseError::InvalidValue {
                key: "timer_mode",
                reason: e.to_string(),
            }
        })?),
        Err(_) => None,
    };

    let idle_timer_enabled = config
        .get::<bool>("tracker.idle_timer_enabled")
        .or_else(|_| config.get::<bool>("tracker.idle-timer-enabled"))
        .unwrap_or(true);

    let idle_threshold_seconds = config
        .get::<u64>("tracker.idle_threshold_seconds")
        .or_else(|_| config.get::<u64>("tracker.idle-threshold-seconds"))
        .unwrap_or(DEFAULT_IDLE_THRESHOLD_SECONDS);

    if idle_threshold_seconds == 0 {
        return Err(ConfigParseError::InvalidValue {
            key: "idle_threshold_seconds",
            reason: "must be greater than zero; set idle_timer_enabled false instead".into(),
        });
    }

    let minimum_view_seconds = config
        .get::<u64>("tracker.minimum_view_seconds")
        .or_else(|_| config.get::<u64>("tracker.minimum-view-seconds"))
        .unwrap_or(DEFAULT_MINIMUM_VIEW_SECONDS);

    let idle_warning_seconds = config
        .get::<u64>("tracker.idle_warning_seconds")
        .or_else(|_| config.get::<u64>("tracker.idle-warning-seconds"))
        .unwrap_or(DEFAULT_IDLE_WARNING_SECONDS);

    let auto_save = config
        .get::<bool>("tracker.auto_save")
        .or_else(|_| config.get::<bool>("tracker.auto-save"))
        .unwrap_or(true);

    let cfg = TrackerConfig {
        timer_mode,
        idle_timer_enabled,
        idle_threshold_seconds,
        minimum_view_seconds,
        idle_warning_seconds,
        auto_save,
    };

    pdebug!(
        "Config",
        "tracker: mode={} idle_timer={} threshold={}s min_view={}s warn={}s auto_save={}",
        cfg.timer_mode.map_or("unset", |m| m.as_str()),
        cfg.idle_timer_enabled,
        cfg.idle_threshold_seconds,
        cfg.minimum_view_seconds,
        cfg.idle_warning_seconds,
        cfg.auto_save
    );

    Ok(cfg)
}
