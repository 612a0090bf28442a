// Author: Dustin Pilgrim
// License: MIT

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        action::Action,
        clock::{Clock, SystemClock},
        config::TrackerConfig,
        error::{Error, SnapshotError, StateError},
        events::Event,
        metrics::EditMetrics,
        mode::TimerMode,
        session::SegmentId,
        snapshot::TrackerSnapshot,
        tracker::TimeTracker,
    },
    pdebug, pinfo, pwarn,
};

pub const PROGRESS_VERSION: u32 = 1;

/// Editing time a changed segment needs before it may be submitted.
pub const MIN_RECORDED_SECONDS: f64 = 1.0;

fn default_progress_version() -> u32 {
    PROGRESS_VERSION
}

/// Everything needed to pick a translation job back up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Progress {
    #[serde(default = "default_progress_version")]
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_mode: Option<TimerMode>,

    pub time_tracker: TrackerSnapshot,

    #[serde(default)]
    pub metrics: Vec<EditMetrics>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Progress {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(|e| SnapshotError::Malformed(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::Malformed(e.to_string()))
    }
}

/// One translator's working context: the tracker, the segment on screen and
/// the metrics recorded so far. The host feeds it events and acts on the
/// returned actions.
#[derive(Debug, Clone)]
pub struct Workbench<C: Clock = SystemClock> {
    tracker: TimeTracker<C>,
    active: Option<SegmentId>,
    metrics: BTreeMap<SegmentId, EditMetrics>,
}

impl<C: Clock> Workbench<C> {
    pub fn new(tracker: TimeTracker<C>) -> Self {
        Self {
            tracker,
            active: None,
            metrics: BTreeMap::new(),
        }
    }

    pub fn tracker(&self) -> &TimeTracker<C> {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut TimeTracker<C> {
        &mut self.tracker
    }

    pub fn active_segment(&self) -> Option<SegmentId> {
        self.active
    }

    pub fn metrics(&self) -> impl Iterator<Item = &EditMetrics> {
        self.metrics.values()
    }

    pub fn metrics_for(&self, id: SegmentId) -> Option<&EditMetrics> {
        self.metrics.get(&id)
    }

    /// Whether `id` has accumulated enough editing time to be submitted.
    pub fn time_recorded(&self, id: SegmentId) -> bool {
        self.tracker.contains(id) && self.tracker.get_editing_time(id) > MIN_RECORDED_SECONDS
    }

    pub fn handle_event(&mut self, event: Event) -> Result<Vec<Action>, Error> {
        pdebug!("Workbench", "event {}", event.name());

        match event {
            Event::ShowSegment { id } => {
                if self.active == Some(id) {
                    return Ok(Vec::new());
                }
                Ok(self.show(id))
            }

            Event::HideSegment { id } => {
                self.tracker.pause_segment(id);
                if self.active == Some(id) {
                    self.active = None;
                }
                Ok(Vec::new())
            }

            Event::UserActivity { id } => {
                self.tracker.update_activity(id);
                Ok(Vec::new())
            }

            Event::ManualPause { id } => {
                self.require_manual()?;
                self.tracker.pause_manual_timer(id);
                Ok(Vec::new())
            }

            Event::ManualStart { id } => {
                self.require_manual()?;
                if !self.tracker.contains(id) {
                    return Ok(Vec::new());
                }

                // Restored sessions have no view time until shown again.
                let Some(left) = self.tracker.remaining_view_wait(id) else {
                    return Err(StateError::NotShown(id).into());
                };
                if left > 0.0 {
                    return Err(StateError::ViewTimeNotElapsed {
                        segment: id,
                        remaining_ms: (left * 1000.0).ceil() as u64,
                    }
                    .into());
                }

                self.tracker.start_manual_timer(id);
                Ok(Vec::new())
            }

            Event::Navigate {
                from,
                to,
                source,
                original,
                edited,
            } => self.navigate(from, to, source, original, edited),

            Event::CheckIdle => Ok(self.check_idle().into_iter().collect()),

            Event::ResetProgress => {
                self.tracker.clear();
                self.metrics.clear();
                self.active = None;
                pinfo!("Workbench", "progress reset");
                Ok(vec![Action::PersistProgress])
            }
        }
    }

    fn require_manual(&self) -> Result<(), Error> {
        if self.tracker.mode().is_manual() {
            Ok(())
        } else {
            Err(StateError::ManualModeOnly.into())
        }
    }

    fn show(&mut self, id: SegmentId) -> Vec<Action> {
        if let Some(prev) = self.active.take() {
            self.tracker.pause_segment(prev);
        }

        self.tracker.start_segment(id);
        if !self.tracker.is_manual_timer_paused(id) {
            self.tracker.resume_segment(id);
        }
        self.active = Some(id);

        vec![Action::SegmentActivated {
            segment: id,
            timer_gated: self.tracker.is_manual_timer_paused(id),
        }]
    }

    fn navigate(
        &mut self,
        from: SegmentId,
        to: SegmentId,
        source: String,
        original: String,
        edited: String,
    ) -> Result<Vec<Action>, Error> {
        if original != edited && !self.time_recorded(from) {
            return Err(StateError::NoTimeRecorded(from).into());
        }

        let edit_time = self.tracker.get_editing_time(from);
        let metrics = EditMetrics::record(from, source, original, edited, edit_time);
        pdebug!(
            "Workbench",
            "segment {} submitted: +{} -{} in {:.1}s",
            from,
            metrics.insertions,
            metrics.deletions,
            edit_time
        );
        self.metrics.insert(from, metrics);

        self.tracker.pause_segment(from);
        if self.active == Some(from) {
            self.active = None;
        }

        // Manual mode: the target always opens behind the gate.
        self.tracker.pause_manual_timer(to);

        let mut out = self.show(to);
        if self.tracker.config().auto_save {
            out.push(Action::PersistProgress);
        }
        Ok(out)
    }

    fn check_idle(&self) -> Option<Action> {
        let segment = self.active?;
        let warn_after = self.tracker.config().idle_warning();
        if warn_after <= 0.0 {
            return None;
        }

        let pending = self.tracker.pending_idle(segment);
        if pending < warn_after {
            return None;
        }

        pwarn!("Workbench", "segment {} idle for {:.0}s", segment, pending);
        Some(Action::IdleWarning {
            segment,
            idle_seconds: pending as u64,
        })
    }

    // ---------------- persistence ----------------

    pub fn progress(&self) -> Progress {
        Progress {
            version: PROGRESS_VERSION,
            timer_mode: self.tracker.mode_is_set().then(|| self.tracker.mode()),
            time_tracker: self.tracker.snapshot(),
            metrics: self.metrics.values().cloned().collect(),
            saved_at: Some(self.tracker.now()),
        }
    }

    /// Rebuilds a workbench from saved progress.
    ///
    /// Running sessions are paused as of `saved_at` (or their last activity
    /// when the save time is unknown), so time spent away counts as paused.
    /// In manual mode every session goes back behind the gate. Nothing is
    /// active afterwards.
    pub fn restore(progress: Progress, config: TrackerConfig, clock: C) -> Result<Self, Error> {
        if progress.version != PROGRESS_VERSION {
            return Err(SnapshotError::UnsupportedVersion(progress.version).into());
        }

        let saved_at = progress.saved_at;
        let mut tracker = TimeTracker::from_snapshot(
            progress.time_tracker,
            progress.timer_mode,
            config,
            clock,
        )?;
        tracker.suspend_at(saved_at);
        tracker.reset_manual_gates();

        let mut workbench = Self::new(tracker);
        for m in progress.metrics {
            workbench.metrics.insert(m.segment_id, m);
        }

        pinfo!(
            "Workbench",
            "restored {} segment(s), {} submitted, {} mode",
            workbench.tracker.len(),
            workbench.metrics.len(),
            workbench.tracker.mode()
        );
        Ok(workbench)
    }
}
