// Author: Dustin Pilgrim
// License: MIT

use serde::Serialize;

use crate::core::session::SegmentId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// A segment became active. `timer_gated` tells the UI to lock the edit
    /// field until the manual timer is started.
    SegmentActivated {
        segment: SegmentId,
        timer_gated: bool,
    },

    /// The active segment has been idle long enough to warn the translator.
    IdleWarning {
        segment: SegmentId,
        idle_seconds: u64,
    },

    /// Progress changed in a way worth persisting (auto-save).
    PersistProgress,
}
