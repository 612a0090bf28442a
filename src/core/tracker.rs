// Author: Dustin Pilgrim
// License: MIT

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::{
    core::{
        clock::{Clock, SystemClock},
        config::TrackerConfig,
        error::{Error, StateError},
        mode::TimerMode,
        session::{EditingSession, IdlePolicy, SegmentId, SessionState},
        utils::seconds_between,
    },
    pdebug,
};

/// Per-segment editing-time accounting.
///
/// Every operation reads "now" from the injected clock and runs to
/// completion; there is no background ticking. Time for running sessions is
/// derived lazily from `last_activity` whenever the tracker is asked.
///
/// Mutators on unknown segments are no-ops and queries return zero, so
/// out-of-order UI events never fail. Only `start_segment` creates sessions.
#[derive(Debug, Clone)]
pub struct TimeTracker<C: Clock = SystemClock> {
    pub(crate) sessions: BTreeMap<SegmentId, EditingSession>,
    pub(crate) mode: Option<TimerMode>,
    config: TrackerConfig,
    clock: C,
}

impl TimeTracker<SystemClock> {
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> TimeTracker<C> {
    pub fn with_clock(config: TrackerConfig, clock: C) -> Self {
        Self {
            sessions: BTreeMap::new(),
            mode: config.timer_mode,
            config,
            clock,
        }
    }

    // ---------------- mode / config ----------------

    /// Effective mode; an unset mode behaves as continuous.
    pub fn mode(&self) -> TimerMode {
        self.mode.unwrap_or_default()
    }

    pub fn mode_is_set(&self) -> bool {
        self.mode.is_some()
    }

    /// Sets the timer policy. Switching policy once sessions exist would
    /// leave their paused state inconsistent, so it is refused.
    pub fn set_mode(&mut self, mode: TimerMode) -> Result<(), Error> {
        let current = self.mode();
        if current != mode && !self.sessions.is_empty() {
            return Err(Error::InvalidState(StateError::ModeLocked {
                current,
                requested: mode,
            }));
        }

        self.mode = Some(mode);
        pdebug!("Tracker", "timer mode set to {}", mode);
        Ok(())
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn set_idle_timer_enabled(&mut self, enabled: bool) {
        self.config.idle_timer_enabled = enabled;
    }

    pub fn idle_policy(&self) -> IdlePolicy {
        if self.config.idle_timer_enabled {
            IdlePolicy::Threshold(self.config.idle_threshold())
        } else {
            IdlePolicy::Disabled
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ---------------- lifecycle ----------------

    /// Ensures a session exists for `id`.
    ///
    /// Manual mode gates every segment on entry: new sessions start paused,
    /// and re-entering a segment pauses it again so the translator has to
    /// opt in to being timed.
    pub fn start_segment(&mut self, id: SegmentId) {
        let now = self.clock.now();
        let manual = self.mode().is_manual();
        let policy = self.idle_policy();

        let Some(session) = self.sessions.get_mut(&id) else {
            let session = if manual {
                EditingSession::new_gated(now)
            } else {
                EditingSession::new(now)
            };
            self.sessions.insert(id, session);
            pdebug!("Tracker", "segment {} opened ({})", id, self.mode());
            return;
        };

        if !manual {
            return;
        }

        if !session.is_manual_paused {
            session.is_manual_paused = true;
            if !session.is_paused {
                session.settle(now, policy);
                session.is_paused = true;
                session.pause_time = Some(now);
            }
            pdebug!("Tracker", "segment {} re-gated on entry", id);
        }

        if session.segment_view_time.is_none() {
            session.segment_view_time = Some(now);
        }
    }

    pub fn pause_segment(&mut self, id: SegmentId) {
        let now = self.clock.now();
        let policy = self.idle_policy();

        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        if session.is_paused {
            return;
        }

        session.settle(now, policy);
        session.pause_time = Some(now);
        session.is_paused = true;
        pdebug!("Tracker", "segment {} paused (active {:.1}s)", id, session.active_time);
    }

    /// Resumes a paused session unless the manual gate holds it.
    pub fn resume_segment(&mut self, id: SegmentId) {
        let now = self.clock.now();
        let manual = self.mode().is_manual();

        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        if !session.is_paused || (manual && session.is_manual_paused) {
            return;
        }

        if let Some(since) = session.pause_time.take() {
            session.total_paused_duration += seconds_between(since, now);
        }
        session.is_paused = false;
        session.touch(now);
        pdebug!("Tracker", "segment {} resumed", id);
    }

    /// Records user activity (e.g. a keystroke) on `id`.
    pub fn update_activity(&mut self, id: SegmentId) {
        let now = self.clock.now();
        let policy = self.idle_policy();

        if let Some(session) = self.sessions.get_mut(&id) {
            session.settle(now, policy);
        }
    }

    // ---------------- manual ("PET") timer ----------------

    pub fn pause_manual_timer(&mut self, id: SegmentId) {
        if !self.mode().is_manual() {
            return;
        }
        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        session.is_manual_paused = true;
        self.pause_segment(id);
    }

    pub fn start_manual_timer(&mut self, id: SegmentId) {
        if !self.mode().is_manual() {
            return;
        }
        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        session.is_manual_paused = false;
        self.resume_segment(id);
    }

    pub fn is_manual_timer_paused(&self, id: SegmentId) -> bool {
        self.mode().is_manual()
            && self.sessions.get(&id).is_some_and(|s| s.is_manual_paused)
    }

    /// Seconds left before the manual timer of `id` may be started.
    /// `None` when the segment has no view time to measure from.
    pub fn remaining_view_wait(&self, id: SegmentId) -> Option<f64> {
        let viewed = self.sessions.get(&id)?.segment_view_time?;
        let waited = seconds_between(viewed, self.clock.now());
        Some((self.config.minimum_view() - waited).max(0.0))
    }

    pub fn can_start_manual_timer(&self, id: SegmentId) -> bool {
        self.remaining_view_wait(id).is_some_and(|left| left <= 0.0)
    }

    // ---------------- queries ----------------

    /// Active editing seconds for `id`, including the live, not yet settled
    /// share of a running session's current gap.
    pub fn get_editing_time(&self, id: SegmentId) -> f64 {
        match self.sessions.get(&id) {
            Some(session) => {
                session.active_time + session.live_active(self.clock.now(), self.idle_policy())
            }
            None => 0.0,
        }
    }

    pub fn idle_time(&self, id: SegmentId) -> f64 {
        self.sessions.get(&id).map_or(0.0, |s| s.idle_time)
    }

    /// Idle seconds the current gap would add if activity arrived now.
    /// Read-only, so periodic checks never double count.
    pub fn pending_idle(&self, id: SegmentId) -> f64 {
        self.sessions
            .get(&id)
            .map_or(0.0, |s| s.live_idle(self.clock.now(), self.idle_policy()))
    }

    pub fn state(&self, id: SegmentId) -> Option<SessionState> {
        self.sessions.get(&id).map(|s| s.state(self.mode()))
    }

    pub fn session(&self, id: SegmentId) -> Option<&EditingSession> {
        self.sessions.get(&id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = (SegmentId, &EditingSession)> {
        self.sessions.iter().map(|(id, s)| (*id, s))
    }

    pub fn contains(&self, id: SegmentId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    // ---------------- bulk ----------------

    /// Drops every session ("reset progress"). The mode stays as it was.
    pub fn clear(&mut self) {
        self.sessions.clear();
        pdebug!("Tracker", "all sessions cleared");
    }

    /// Settles and pauses every running session as of `at`, or as of its
    /// own last activity when `at` is `None`. Anything after that instant is
    /// paused time once the session resumes.
    pub fn suspend_at(&mut self, at: Option<DateTime<Utc>>) {
        let policy = self.idle_policy();

        for (id, session) in self.sessions.iter_mut() {
            if session.is_paused {
                continue;
            }

            let at = at.map_or(session.last_activity, |t| t.max(session.last_activity));
            session.settle(at, policy);
            session.pause_time = Some(at);
            session.is_paused = true;
            pdebug!("Tracker", "segment {} suspended at {}", id, at);
        }
    }

    /// Manual-pauses every session and forgets view times, so restored work
    /// restarts behind the gate and waits the minimum view time again.
    pub fn reset_manual_gates(&mut self) {
        if !self.mode().is_manual() {
            return;
        }

        let ids: Vec<SegmentId> = self.sessions.keys().copied().collect();
        for id in ids {
            self.pause_manual_timer(id);
            if let Some(session) = self.sessions.get_mut(&id) {
                session.segment_view_time = None;
            }
        }
    }
}
