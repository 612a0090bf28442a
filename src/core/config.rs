// Author: Dustin Pilgrim
// License: MIT

use crate::core::mode::TimerMode;

pub const DEFAULT_IDLE_THRESHOLD_SECONDS: u64 = 30;
pub const DEFAULT_MINIMUM_VIEW_SECONDS: u64 = 2;
pub const DEFAULT_IDLE_WARNING_SECONDS: u64 = 60;

/// Effective tracker/workbench configuration.
///
/// This is the canonical representation the core consumes; the rune loader
/// in `crate::config` produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Mode chosen for the project, if the configuration pins one.
    pub timer_mode: Option<TimerMode>,

    /// When disabled every gap counts as active editing time.
    pub idle_timer_enabled: bool,

    /// Gaps longer than this are split into active (up to the threshold) and idle.
    pub idle_threshold_seconds: u64,

    /// Manual mode: how long a segment must be visible before its timer may start.
    pub minimum_view_seconds: u64,

    /// Pending idle that raises a warning on `CheckIdle`.
    pub idle_warning_seconds: u64,

    /// Ask the host to persist progress after each submitted segment.
    pub auto_save: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            timer_mode: None,
            idle_timer_enabled: true,
            idle_threshold_seconds: DEFAULT_IDLE_THRESHOLD_SECONDS,
            minimum_view_seconds: DEFAULT_MINIMUM_VIEW_SECONDS,
            idle_warning_seconds: DEFAULT_IDLE_WARNING_SECONDS,
            auto_save: true,
        }
    }
}

impl TrackerConfig {
    pub fn idle_threshold(&self) -> f64 {
        self.idle_threshold_seconds as f64
    }

    pub fn minimum_view(&self) -> f64 {
        self.minimum_view_seconds as f64
    }

    pub fn idle_warning(&self) -> f64 {
        self.idle_warning_seconds as f64
    }
}
