// Author: Dustin Pilgrim
// License: MIT

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        clock::Clock,
        config::TrackerConfig,
        error::{Error, SnapshotError},
        mode::TimerMode,
        session::{EditingSession, SegmentId},
        tracker::TimeTracker,
    },
    pdebug,
};

pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Persisted shape of a tracker.
///
/// Segment keys are strings so the document maps cleanly onto JSON and
/// document stores; they must parse back to integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackerSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Raw mode string; validated on restore so bad values get a precise error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default)]
    pub sessions: BTreeMap<String, SessionRecord>,
}

/// One session as stored.
///
/// Every key is optional at the serde level; `into_session` decides which
/// ones are required and which take documented defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionRecord {
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pause_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_paused_time: Option<f64>,
    #[serde(default)]
    pub is_paused: Option<bool>,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active_time: Option<f64>,
    #[serde(default)]
    pub idle_time: Option<f64>,
    #[serde(default, alias = "is_pet_paused")]
    pub is_manual_paused: Option<bool>,
    #[serde(default)]
    pub segment_view_time: Option<DateTime<Utc>>,
}

impl From<&EditingSession> for SessionRecord {
    fn from(s: &EditingSession) -> Self {
        Self {
            start_time: Some(s.start_time),
            pause_time: s.pause_time,
            total_paused_time: Some(s.total_paused_duration),
            is_paused: Some(s.is_paused),
            last_activity: Some(s.last_activity),
            active_time: Some(s.active_time),
            idle_time: Some(s.idle_time),
            is_manual_paused: Some(s.is_manual_paused),
            segment_view_time: s.segment_view_time,
        }
    }
}

impl SessionRecord {
    pub fn into_session(self, segment: SegmentId) -> Result<EditingSession, SnapshotError> {
        let start_time = self.start_time.ok_or(SnapshotError::MissingField {
            segment,
            field: "start_time",
        })?;
        let last_activity = self.last_activity.ok_or(SnapshotError::MissingField {
            segment,
            field: "last_activity",
        })?;
        let is_paused = self.is_paused.ok_or(SnapshotError::MissingField {
            segment,
            field: "is_paused",
        })?;
        let is_manual_paused = self.is_manual_paused.unwrap_or(false);

        let invalid = |field: &'static str, reason: &str| SnapshotError::InvalidValue {
            segment,
            field,
            reason: reason.to_string(),
        };
        if last_activity < start_time {
            return Err(invalid("last_activity", "earlier than start_time"));
        }
        if is_manual_paused && !is_paused {
            return Err(invalid("is_manual_paused", "set on a session that is not paused"));
        }
        if self.pause_time.is_some() != is_paused {
            let reason = if is_paused {
                "missing on a paused session"
            } else {
                "set on a session that is not paused"
            };
            return Err(invalid("pause_time", reason));
        }

        Ok(EditingSession {
            start_time,
            pause_time: self.pause_time,
            total_paused_duration: counter(segment, "total_paused_time", self.total_paused_time)?,
            is_paused,
            last_activity,
            active_time: counter(segment, "active_time", self.active_time)?,
            idle_time: counter(segment, "idle_time", self.idle_time)?,
            is_manual_paused,
            segment_view_time: self.segment_view_time,
        })
    }
}

fn counter(segment: SegmentId, field: &'static str, value: Option<f64>) -> Result<f64, SnapshotError> {
    let v = value.unwrap_or(0.0);
    if !v.is_finite() || v < 0.0 {
        return Err(SnapshotError::InvalidValue {
            segment,
            field,
            reason: format!("expected a non-negative number of seconds, got {v}"),
        });
    }
    Ok(v)
}

/// Only the canonical decimal form is accepted, so two keys can never name
/// the same segment.
fn parse_segment_key(key: &str) -> Result<SegmentId, SnapshotError> {
    key.parse::<SegmentId>()
        .ok()
        .filter(|id| id.to_string() == key)
        .ok_or_else(|| SnapshotError::InvalidSegmentKey(key.to_string()))
}

impl TrackerSnapshot {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(|e| SnapshotError::Malformed(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::Malformed(e.to_string()))
    }

    /// Validated mode carried by the snapshot, if any.
    pub fn timer_mode(&self) -> Result<Option<TimerMode>, SnapshotError> {
        match &self.mode {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| SnapshotError::UnknownMode(raw.clone())),
            None => Ok(None),
        }
    }
}

impl<C: Clock> TimeTracker<C> {
    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            version: SNAPSHOT_VERSION,
            mode: self.mode.map(|m| m.as_str().to_string()),
            sessions: self
                .sessions
                .iter()
                .map(|(id, s)| (id.to_string(), SessionRecord::from(s)))
                .collect(),
        }
    }

    /// Rebuilds a tracker from a snapshot.
    ///
    /// Mode precedence: `mode`, then the snapshot's own mode, then the
    /// configuration. Any corrupt session rejects the whole snapshot.
    pub fn from_snapshot(
        snapshot: TrackerSnapshot,
        mode: Option<TimerMode>,
        config: TrackerConfig,
        clock: C,
    ) -> Result<Self, Error> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version).into());
        }

        let stored_mode = snapshot.timer_mode()?;

        let mut sessions = BTreeMap::new();
        for (key, record) in snapshot.sessions {
            let id = parse_segment_key(&key)?;
            sessions.insert(id, record.into_session(id)?);
        }

        let mut tracker = TimeTracker::with_clock(config, clock);
        if let Some(m) = mode.or(stored_mode) {
            tracker.mode = Some(m);
        }
        tracker.sessions = sessions;

        pdebug!("Tracker", "restored {} session(s) in {} mode", tracker.len(), tracker.mode());
        Ok(tracker)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        self.snapshot().to_json()
    }

    pub fn from_json(
        json: &str,
        mode: Option<TimerMode>,
        config: TrackerConfig,
        clock: C,
    ) -> Result<Self, Error> {
        let snapshot = TrackerSnapshot::from_json(json)?;
        Self::from_snapshot(snapshot, mode, config, clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::session::SessionState;

    fn tracker(clock: &ManualClock, mode: TimerMode) -> TimeTracker<ManualClock> {
        let mut t = TimeTracker::with_clock(TrackerConfig::default(), clock.clone());
        t.set_mode(mode).unwrap();
        t
    }

    fn restore(json: &str) -> Result<TimeTracker<ManualClock>, Error> {
        TimeTracker::from_json(json, None, TrackerConfig::default(), ManualClock::at_epoch())
    }

    #[test]
    fn round_trip_preserves_editing_time() {
        let clock = ManualClock::at_epoch();
        let mut t = tracker(&clock, TimerMode::Continuous);

        t.start_segment(1);
        t.start_segment(2);
        clock.set_secs(10.25);
        t.update_activity(1);
        t.pause_segment(2);
        clock.set_secs(70.5);
        t.update_activity(1);
        clock.set_secs(80.0);

        let json = t.to_json().unwrap();
        let restored =
            TimeTracker::from_json(&json, Some(t.mode()), TrackerConfig::default(), clock.clone())
                .unwrap();

        for id in [1, 2, 3] {
            assert_eq!(restored.get_editing_time(id), t.get_editing_time(id));
            assert_eq!(restored.idle_time(id), t.idle_time(id));
        }
        assert_eq!(restored.snapshot(), t.snapshot());
    }

    #[test]
    fn manual_gate_survives_round_trip() {
        let clock = ManualClock::at_epoch();
        let mut t = tracker(&clock, TimerMode::Manual);
        t.start_segment(4);

        let restored = TimeTracker::from_snapshot(
            t.snapshot(),
            None,
            TrackerConfig::default(),
            clock.clone(),
        )
        .unwrap();

        assert_eq!(restored.mode(), TimerMode::Manual);
        assert_eq!(restored.state(4), Some(SessionState::ManuallyPaused));
        assert!(restored.is_manual_timer_paused(4));
    }

    #[test]
    fn explicit_mode_wins_over_stored_mode() {
        let json = r#"{ "mode": "pet", "sessions": {} }"#;
        let t = TimeTracker::from_json(
            json,
            Some(TimerMode::Continuous),
            TrackerConfig::default(),
            ManualClock::at_epoch(),
        )
        .unwrap();
        assert_eq!(t.mode(), TimerMode::Continuous);

        assert_eq!(restore(json).unwrap().mode(), TimerMode::Manual);
    }

    #[test]
    fn missing_timestamp_is_rejected() {
        let json = r#"{
            "sessions": {
                "7": { "is_paused": false, "last_activity": "2024-05-01T10:00:00Z", "active_time": 12.0 }
            }
        }"#;

        let err = restore(json).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidSnapshot(SnapshotError::MissingField {
                segment: 7,
                field: "start_time"
            })
        );
    }

    #[test]
    fn optional_fields_take_documented_defaults() {
        let json = r#"{
            "sessions": {
                "0": {
                    "start_time": "2024-05-01T10:00:00Z",
                    "last_activity": "2024-05-01T10:00:30.250Z",
                    "is_paused": true,
                    "pause_time": "2024-05-01T10:00:31Z",
                    "is_pet_paused": true
                }
            }
        }"#;

        let t = restore(json).unwrap();
        let s = t.session(0).unwrap();
        assert_eq!(s.active_time, 0.0);
        assert_eq!(s.idle_time, 0.0);
        assert_eq!(s.total_paused_duration, 0.0);
        assert!(s.is_manual_paused);
        assert_eq!(s.segment_view_time, None);
        assert_eq!(s.last_activity.timestamp_subsec_millis(), 250);
        assert!(!t.mode_is_set());
    }

    #[test]
    fn malformed_shapes_are_rejected() {
        let unknown_key = r#"{ "sessions": { "1": {
            "start_time": "2024-05-01T10:00:00Z", "last_activity": "2024-05-01T10:00:00Z",
            "is_paused": false, "typing_speed": 3 } } }"#;
        assert!(matches!(
            restore(unknown_key),
            Err(Error::InvalidSnapshot(SnapshotError::Malformed(_)))
        ));

        let bad_key = r#"{ "sessions": { "first": {
            "start_time": "2024-05-01T10:00:00Z", "last_activity": "2024-05-01T10:00:00Z",
            "is_paused": false } } }"#;
        assert_eq!(
            restore(bad_key).unwrap_err(),
            Error::InvalidSnapshot(SnapshotError::InvalidSegmentKey("first".into()))
        );

        let negative = r#"{ "sessions": { "1": {
            "start_time": "2024-05-01T10:00:00Z", "last_activity": "2024-05-01T10:00:00Z",
            "is_paused": false, "active_time": -4.0 } } }"#;
        assert!(matches!(
            restore(negative),
            Err(Error::InvalidSnapshot(SnapshotError::InvalidValue { segment: 1, field: "active_time", .. }))
        ));

        assert_eq!(
            restore(r#"{ "version": 2, "sessions": {} }"#).unwrap_err(),
            Error::InvalidSnapshot(SnapshotError::UnsupportedVersion(2))
        );

        assert_eq!(
            restore(r#"{ "mode": "stopwatch" }"#).unwrap_err(),
            Error::InvalidSnapshot(SnapshotError::UnknownMode("stopwatch".into()))
        );

        assert!(matches!(
            restore(r#"{ "sessions": { "1": { "start_time": 17 } } }"#),
            Err(Error::InvalidSnapshot(SnapshotError::Malformed(_)))
        ));
    }

    fn session_json(key: &str, fields: &str) -> String {
        format!(
            r#"{{ "sessions": {{ "{key}": {{
                "start_time": "2024-05-01T10:00:00Z", "last_activity": "2024-05-01T10:00:05Z",
                {fields} }} }} }}"#
        )
    }

    #[test]
    fn non_canonical_segment_keys_are_rejected() {
        for key in ["+1", " 1", "1 ", "01", "007"] {
            assert_eq!(
                restore(&session_json(key, r#""is_paused": false"#)).unwrap_err(),
                Error::InvalidSnapshot(SnapshotError::InvalidSegmentKey(key.into())),
                "key {key:?}"
            );
        }

        assert!(restore(&session_json("0", r#""is_paused": false"#)).is_ok());
        assert!(restore(&session_json("10", r#""is_paused": false"#)).is_ok());
    }

    #[test]
    fn aliased_keys_cannot_overwrite_each_other() {
        let json = r#"{ "sessions": {
            "1":  { "start_time": "2024-05-01T10:00:00Z", "last_activity": "2024-05-01T10:00:00Z",
                    "is_paused": false, "active_time": 40.0 },
            "+1": { "start_time": "2024-05-01T10:00:00Z", "last_activity": "2024-05-01T10:00:00Z",
                    "is_paused": false, "active_time": 2.0 } } }"#;

        assert_eq!(
            restore(json).unwrap_err(),
            Error::InvalidSnapshot(SnapshotError::InvalidSegmentKey("+1".into()))
        );
    }

    #[test]
    fn contradictory_session_flags_are_rejected() {
        let cases = [
            (r#""is_paused": false, "is_manual_paused": true"#, "is_manual_paused"),
            (r#""is_paused": true"#, "pause_time"),
            (r#""is_paused": false, "pause_time": "2024-05-01T10:00:05Z""#, "pause_time"),
        ];
        for (fields, field) in cases {
            let err = restore(&session_json("3", fields)).unwrap_err();
            assert!(
                matches!(
                    &err,
                    Error::InvalidSnapshot(SnapshotError::InvalidValue { segment: 3, field: f, .. }) if *f == field
                ),
                "{fields}: {err}"
            );
        }

        let backwards = r#"{ "sessions": { "3": {
            "start_time": "2024-05-01T10:00:05Z", "last_activity": "2024-05-01T10:00:00Z",
            "is_paused": false } } }"#;
        assert!(matches!(
            restore(backwards),
            Err(Error::InvalidSnapshot(SnapshotError::InvalidValue { field: "last_activity", .. }))
        ));

        let consistent = session_json(
            "3",
            r#""is_paused": true, "pause_time": "2024-05-01T10:00:05Z", "is_manual_paused": true"#,
        );
        assert!(restore(&consistent).is_ok());
    }
}
