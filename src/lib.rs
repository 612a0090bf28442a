// Author: Dustin Pilgrim
// License: MIT

pub mod config;
pub mod core;
pub mod log;
pub mod log_file;

pub use crate::core::{
    action::Action,
    clock::{Clock, ManualClock, SystemClock},
    config::TrackerConfig,
    error::{Error, SnapshotError, StateError},
    events::Event,
    metrics::EditMetrics,
    mode::TimerMode,
    session::{EditingSession, SegmentId, SessionState},
    snapshot::TrackerSnapshot,
    tracker::TimeTracker,
    workbench::{Progress, Workbench},
};
