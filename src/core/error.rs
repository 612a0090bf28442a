// Author: Dustin Pilgrim
// License: MIT

use std::fmt;

use crate::core::mode::TimerMode;
use crate::core::session::SegmentId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An event was rejected because it is invalid in the current state.
    ///
    /// Examples:
    /// - switching timer mode after sessions exist
    /// - manual start before the minimum view time elapsed
    /// - leaving an edited segment with no recorded time
    InvalidState(StateError),

    /// A stored snapshot could not be restored.
    ///
    /// Restoring never fills in missing timestamps: silently zeroing a
    /// translator's accumulated time is worse than refusing the load.
    InvalidSnapshot(SnapshotError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    ModeLocked {
        current: TimerMode,
        requested: TimerMode,
    },
    ManualModeOnly,
    ViewTimeNotElapsed {
        segment: SegmentId,
        remaining_ms: u64,
    },
    NoTimeRecorded(SegmentId),
    /// Manual start on a segment that has not been shown since it was restored.
    NotShown(SegmentId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Not valid JSON, wrong value types or unknown keys.
    Malformed(String),
    UnsupportedVersion(u32),
    UnknownMode(String),
    InvalidSegmentKey(String),
    MissingField {
        segment: SegmentId,
        field: &'static str,
    },
    InvalidValue {
        segment: SegmentId,
        field: &'static str,
        reason: String,
    },
}

// ---------------- Display ----------------

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidState(e) => write!(f, "{e}"),
            Error::InvalidSnapshot(e) => write!(f, "invalid snapshot: {e}"),
        }
    }
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::ModeLocked { current, requested } =>
                write!(f, "cannot switch timer mode from {current} to {requested} while sessions exist"),
            StateError::ManualModeOnly =>
                write!(f, "manual timer controls require manual mode"),
            StateError::ViewTimeNotElapsed { segment, remaining_ms } =>
                write!(f, "segment {segment}: wait {:.1}s before starting the timer", *remaining_ms as f64 / 1000.0),
            StateError::NoTimeRecorded(segment) =>
                write!(f, "segment {segment} was edited but no editing time was recorded"),
            StateError::NotShown(segment) =>
                write!(f, "segment {segment} must be shown before its timer can start"),
        }
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Malformed(msg) =>
                write!(f, "malformed data: {msg}"),
            SnapshotError::UnsupportedVersion(v) =>
                write!(f, "unsupported schema version {v}"),
            SnapshotError::UnknownMode(m) =>
                write!(f, "unknown timer mode '{m}'"),
            SnapshotError::InvalidSegmentKey(k) =>
                write!(f, "segment key '{k}' is not a non-negative integer"),
            SnapshotError::MissingField { segment, field } =>
                write!(f, "segment {segment}: missing required field '{field}'"),
            SnapshotError::InvalidValue { segment, field, reason } =>
                write!(f, "segment {segment}: invalid '{field}': {reason}"),
        }
    }
}

impl std::error::Error for Error {}
impl std::error::Error for StateError {}
impl std::error::Error for SnapshotError {}

impl From<StateError> for Error {
    fn from(e: StateError) -> Self {
        Error::InvalidState(e)
    }
}

impl From<SnapshotError> for Error {
    fn from(e: SnapshotError) -> Self {
        Error::InvalidSnapshot(e)
    }
}
