use std::fmt::Arguments;
use std::fs::{OpenOptions, create_dir_all};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::Local;
use once_cell::sync::Lazy;

#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum LogLevel {
    Error = 1,
    Warn  = 2,
    Info  = 3,
    Debug = 4,
}

impl LogLevel {
    /// Get ANSI color code for terminal output
    fn color(&self) -> &'static str {
        match self {
            LogLevel::Error => "\x1b[31m", // Red
            LogLevel::Warn  => "\x1b[33m", // Yellow
            LogLevel::Info  => "\x1b[36m", // Cyan
            LogLevel::Debug => "\x1b[90m", // Gray
        }
    }

    fn short(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERR",
            LogLevel::Warn  => "WRN",
            LogLevel::Info  => "INF",
            LogLevel::Debug => "DBG",
        }
    }
}

const RESET_COLOR: &str = "\x1b[0m";

pub struct Config {
    pub level: LogLevel,
    pub use_colors: bool,
    /// File sink; `None` keeps logging on the console only.
    pub file: Option<PathBuf>,
}

pub static GLOBAL_CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| {
    Mutex::new(Config {
        level: LogLevel::Info,
        use_colors: std::io::stdout().is_terminal(),
        file: None,
    })
});

fn config() -> MutexGuard<'static, Config> {
    GLOBAL_CONFIG
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Set verbose/debug mode
pub fn set_verbose(enabled: bool) {
    config().level = if enabled { LogLevel::Debug } else { LogLevel::Info };
}

/// Set the minimum log level
pub fn set_log_level(level: LogLevel) {
    config().level = level;
}

/// Route log lines to `path` in addition to the console.
pub fn set_log_file(path: Option<PathBuf>) {
    config().file = path;
}

/// Core logging function
pub fn log_message(level: LogLevel, prefix: &str, args: Arguments) {
    let config = config();

    if level > config.level {
        return;
    }

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

    let file_line = format!("[{}][{}][{}] {}", timestamp, level.short(), prefix, args);

    let console_line = if config.use_colors {
        format!("{}●{} [{}][{}] {}",
            level.color(),
            RESET_COLOR,
            timestamp,
            prefix,
            args)
    } else {
        file_line.clone()
    };

    if let Some(path) = &config.file {
        if let Err(e) = write_line_to_log(path, &file_line) {
            eprintln!("Failed to write log: {}", e);
        }
    }

    // Console only in verbose mode, errors always
    if config.level == LogLevel::Debug || level == LogLevel::Error {
        match level {
            LogLevel::Error => eprintln!("{}", console_line),
            _ => println!("{}", console_line),
        }
    }
}

/// Flexible macro to allow formatted logging
#[macro_export]
macro_rules! plog {
    ($level:expr, $prefix:expr, $($arg:tt)*) => {
        $crate::log::log_message($level, $prefix, format_args!($($arg)*))
    };
}

/// Convenience macros
#[macro_export]
macro_rules! pinfo {
    ($prefix:expr, $($arg:tt)*) => { $crate::plog!($crate::log::LogLevel::Info, $prefix, $($arg)*) };
}

#[macro_export]
macro_rules! pwarn {
    ($prefix:expr, $($arg:tt)*) => { $crate::plog!($crate::log::LogLevel::Warn, $prefix, $($arg)*) };
}

#[macro_export]
macro_rules! perror {
    ($prefix:expr, $($arg:tt)*) => { $crate::plog!($crate::log::LogLevel::Error, $prefix, $($arg)*) };
}

#[macro_export]
macro_rules! pdebug {
    ($prefix:expr, $($arg:tt)*) => { $crate::plog!($crate::log::LogLevel::Debug, $prefix, $($arg)*) };
}

/// Default log file path
pub fn log_path() -> PathBuf {
    let mut path = dirs::cache_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    path.push("petrack");
    path.push("petrack.log");
    path
}

fn write_line_to_log(path: &PathBuf, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    writeln!(file, "{}", line)?;
    Ok(())
}
