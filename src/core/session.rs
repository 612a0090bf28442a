// Author: Dustin Pilgrim
// License: MIT

use chrono::{DateTime, Utc};

use crate::core::mode::TimerMode;
use crate::core::utils::seconds_between;

/// Caller-assigned, stable segment identifier.
pub type SegmentId = u32;

/// Logical state of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accruing active or idle time depending on gap size.
    Running,
    /// Generic pause (navigated away, hidden).
    Paused,
    /// Manual-mode gate; only an explicit start lifts it.
    ManuallyPaused,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Running => "running",
            SessionState::Paused => "paused",
            SessionState::ManuallyPaused => "manually paused",
        }
    }
}

/// How a gap since the last activity is split between active and idle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IdlePolicy {
    /// Idle timer disabled: the whole gap is editing time.
    Disabled,
    /// Up to the threshold is active, only the excess is idle.
    Threshold(f64),
}

impl IdlePolicy {
    /// Returns `(active, idle)` shares of `gap`.
    pub fn split(&self, gap: f64) -> (f64, f64) {
        match *self {
            IdlePolicy::Disabled => (gap, 0.0),
            IdlePolicy::Threshold(t) if gap > t => (t, gap - t),
            IdlePolicy::Threshold(_) => (gap, 0.0),
        }
    }
}

/// Time accounting for one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct EditingSession {
    pub start_time: DateTime<Utc>,
    pub pause_time: Option<DateTime<Utc>>,
    /// Seconds spent paused, accumulated on each resume.
    pub total_paused_duration: f64,
    pub is_paused: bool,
    pub last_activity: DateTime<Utc>,
    pub active_time: f64,
    pub idle_time: f64,
    pub is_manual_paused: bool,
    /// First time the segment was shown while in manual mode.
    pub segment_view_time: Option<DateTime<Utc>>,
}

impl EditingSession {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            start_time: now,
            pause_time: None,
            total_paused_duration: 0.0,
            is_paused: false,
            last_activity: now,
            active_time: 0.0,
            idle_time: 0.0,
            is_manual_paused: false,
            segment_view_time: None,
        }
    }

    /// A session that starts behind the manual gate.
    pub fn new_gated(now: DateTime<Utc>) -> Self {
        Self {
            pause_time: Some(now),
            is_paused: true,
            is_manual_paused: true,
            segment_view_time: Some(now),
            ..Self::new(now)
        }
    }

    pub fn state(&self, mode: TimerMode) -> SessionState {
        if !self.is_paused {
            SessionState::Running
        } else if mode.is_manual() && self.is_manual_paused {
            SessionState::ManuallyPaused
        } else {
            SessionState::Paused
        }
    }

    pub fn gap(&self, now: DateTime<Utc>) -> f64 {
        seconds_between(self.last_activity, now)
    }

    /// Credit the gap since the last activity and move the activity mark to
    /// `now`. Paused sessions accrue nothing.
    pub fn settle(&mut self, now: DateTime<Utc>, policy: IdlePolicy) {
        if !self.is_paused {
            let (active, idle) = policy.split(self.gap(now));
            self.active_time += active;
            self.idle_time += idle;
        }
        self.touch(now);
    }

    /// Advance the activity mark; never moves it backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_activity {
            self.last_activity = now;
        }
    }

    /// Active share of the current gap that has not been credited yet.
    pub fn live_active(&self, now: DateTime<Utc>, policy: IdlePolicy) -> f64 {
        if self.is_paused {
            return 0.0;
        }
        policy.split(self.gap(now)).0
    }

    /// Idle that would be recorded if activity arrived at `now`.
    pub fn live_idle(&self, now: DateTime<Utc>, policy: IdlePolicy) -> f64 {
        if self.is_paused {
            return 0.0;
        }
        policy.split(self.gap(now)).1
    }

    /// Paused seconds including the pause currently in progress.
    pub fn paused_total(&self, now: DateTime<Utc>) -> f64 {
        let ongoing = match (self.is_paused, self.pause_time) {
            (true, Some(since)) => seconds_between(since, now),
            _ => 0.0,
        };
        self.total_paused_duration + ongoing
    }
}
