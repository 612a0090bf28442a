// Author: Dustin Pilgrim
// License: MIT

use serde::{Deserialize, Serialize};

use crate::core::session::SegmentId;

/// Input delivered by the host UI on each rerun.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The segment became the visible, editable one.
    ShowSegment {
        id: SegmentId,
    },
    /// The segment is no longer visible (tab hidden, closed, ...).
    HideSegment {
        id: SegmentId,
    },

    /// Any interaction with the edit field, e.g. a keystroke.
    UserActivity {
        id: SegmentId,
    },

    ManualPause {
        id: SegmentId,
    },
    ManualStart {
        id: SegmentId,
    },

    /// Submit `from` and move to `to`.
    Navigate {
        from: SegmentId,
        to: SegmentId,
        source: String,
        original: String,
        edited: String,
    },

    /// Periodic poll from the host; reconciles nothing, only reports.
    CheckIdle,

    ResetProgress,
}

impl Event {
    pub fn segment(&self) -> Option<SegmentId> {
        match self {
            Event::ShowSegment { id }
            | Event::HideSegment { id }
            | Event::UserActivity { id }
            | Event::ManualPause { id }
            | Event::ManualStart { id } => Some(*id),
            Event::Navigate { from, .. } => Some(*from),
            Event::CheckIdle | Event::ResetProgress => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::ShowSegment { .. } => "show_segment",
            Event::HideSegment { .. } => "hide_segment",
            Event::UserActivity { .. } => "user_activity",
            Event::ManualPause { .. } => "manual_pause",
            Event::ManualStart { .. } => "manual_start",
            Event::Navigate { .. } => "navigate",
            Event::CheckIdle => "check_idle",
            Event::ResetProgress => "reset_progress",
        }
    }
}
