// Author: Dustin Pilgrim
// License: MIT

use chrono::{DateTime, Utc};

use crate::core::clock::{Clock, ManualClock};
use crate::core::config::TrackerConfig;
use crate::core::error::{Error, StateError};
use crate::core::mode::TimerMode;
use crate::core::session::SessionState;
use crate::core::tracker::TimeTracker;

fn tracker(mode: TimerMode) -> (TimeTracker<ManualClock>, ManualClock) {
    let clock = ManualClock::at_epoch();
    let mut t = TimeTracker::with_clock(TrackerConfig::default(), clock.clone());
    t.set_mode(mode).unwrap();
    (t, clock)
}

fn active(t: &TimeTracker<ManualClock>, id: u32) -> f64 {
    t.session(id).unwrap().active_time
}

#[test]
fn continuous_pause_and_resume_excludes_paused_time() {
    let (mut t, clock) = tracker(TimerMode::Continuous);

    t.start_segment(1);
    assert_eq!(t.state(1), Some(SessionState::Running));

    clock.set_secs(10.0);
    t.update_activity(1);
    assert_eq!(active(&t, 1), 10.0);

    clock.set_secs(15.0);
    t.pause_segment(1);
    assert_eq!(active(&t, 1), 15.0);

    clock.set_secs(20.0);
    t.resume_segment(1);
    assert_eq!(t.session(1).unwrap().total_paused_duration, 5.0);
    assert_eq!(t.get_editing_time(1), 15.0);
}

#[test]
fn manual_gate_holds_until_started() {
    let (mut t, clock) = tracker(TimerMode::Manual);

    t.start_segment(1);
    assert!(t.is_manual_timer_paused(1));
    assert_eq!(t.state(1), Some(SessionState::ManuallyPaused));

    clock.set_secs(100.0);
    assert_eq!(t.get_editing_time(1), 0.0);

    t.start_manual_timer(1);
    assert!(!t.is_manual_timer_paused(1));

    clock.set_secs(110.0);
    t.update_activity(1);
    assert_eq!(active(&t, 1), 10.0);
}

#[test]
fn resume_does_not_lift_manual_gate() {
    let (mut t, clock) = tracker(TimerMode::Manual);

    t.start_segment(1);
    clock.set_secs(5.0);
    t.resume_segment(1);

    assert_eq!(t.state(1), Some(SessionState::ManuallyPaused));
    clock.set_secs(20.0);
    assert_eq!(t.get_editing_time(1), 0.0);
}

#[test]
fn long_gap_splits_into_active_and_idle() {
    let (mut t, clock) = tracker(TimerMode::Continuous);

    t.start_segment(1);
    clock.set_secs(50.0);
    t.update_activity(1);

    let s = t.session(1).unwrap();
    assert_eq!(s.idle_time, 20.0);
    assert_eq!(s.active_time, 30.0);
}

#[test]
fn threshold_boundary() {
    let (mut t, clock) = tracker(TimerMode::Continuous);

    t.start_segment(1);
    clock.set_secs(30.0);
    t.update_activity(1);
    assert_eq!(t.idle_time(1), 0.0);
    assert_eq!(active(&t, 1), 30.0);

    clock.set_secs(75.0);
    t.update_activity(1);
    assert_eq!(t.idle_time(1), 15.0);
    assert_eq!(active(&t, 1), 60.0);
}

#[test]
fn pause_uses_the_same_split_as_activity() {
    let (mut t, clock) = tracker(TimerMode::Continuous);

    t.start_segment(1);
    clock.set_secs(45.0);
    t.pause_segment(1);

    assert_eq!(active(&t, 1), 30.0);
    assert_eq!(t.idle_time(1), 15.0);
}

#[test]
fn idle_disabled_counts_whole_gap() {
    let (mut t, clock) = tracker(TimerMode::Continuous);
    t.set_idle_timer_enabled(false);

    t.start_segment(1);
    clock.set_secs(50.0);
    t.update_activity(1);

    assert_eq!(active(&t, 1), 50.0);
    assert_eq!(t.idle_time(1), 0.0);
}

#[test]
fn live_reading_caps_at_threshold() {
    let (mut t, clock) = tracker(TimerMode::Continuous);

    t.start_segment(1);
    clock.set_secs(45.0);

    assert_eq!(t.get_editing_time(1), 30.0);
    assert_eq!(active(&t, 1), 0.0, "queries never settle");
}

#[test]
fn pending_idle_is_read_only() {
    let (mut t, clock) = tracker(TimerMode::Continuous);

    t.start_segment(1);
    clock.set_secs(45.0);

    assert_eq!(t.pending_idle(1), 15.0);
    assert_eq!(t.pending_idle(1), 15.0);
    assert_eq!(t.idle_time(1), 0.0);

    t.update_activity(1);
    assert_eq!(t.idle_time(1), 15.0);
    assert_eq!(t.pending_idle(1), 0.0);
}

#[test]
fn pause_is_idempotent() {
    let (mut t, clock) = tracker(TimerMode::Continuous);

    t.start_segment(1);
    clock.set_secs(15.0);
    t.pause_segment(1);
    let once = t.session(1).unwrap().clone();

    clock.set_secs(20.0);
    t.pause_segment(1);
    assert_eq!(t.session(1).unwrap(), &once);
}

#[test]
fn unknown_segments_are_ignored() {
    let (mut t, _clock) = tracker(TimerMode::Manual);

    t.pause_segment(9);
    t.resume_segment(9);
    t.update_activity(9);
    t.start_manual_timer(9);
    t.pause_manual_timer(9);

    assert!(t.is_empty());
    assert_eq!(t.get_editing_time(9), 0.0);
    assert_eq!(t.idle_time(9), 0.0);
    assert_eq!(t.state(9), None);
    assert!(!t.is_manual_timer_paused(9));
    assert!(!t.can_start_manual_timer(9));
}

#[test]
fn continuous_reentry_keeps_running() {
    let (mut t, clock) = tracker(TimerMode::Continuous);

    t.start_segment(1);
    clock.set_secs(10.0);
    t.start_segment(1);

    assert_eq!(t.state(1), Some(SessionState::Running));
    assert_eq!(t.get_editing_time(1), 10.0);
}

#[test]
fn manual_reentry_regates_running_session() {
    let (mut t, clock) = tracker(TimerMode::Manual);

    t.start_segment(1);
    clock.set_secs(2.0);
    t.start_manual_timer(1);
    clock.set_secs(5.0);
    t.update_activity(1);

    clock.set_secs(7.0);
    t.start_segment(1);

    let s = t.session(1).unwrap();
    assert!(s.is_manual_paused);
    assert_eq!(s.pause_time, Some(clock_at(7.0)));
    assert_eq!(s.active_time, 5.0);

    clock.set_secs(60.0);
    assert_eq!(t.get_editing_time(1), 5.0);
}

#[test]
fn manual_reentry_keeps_earlier_pause_time() {
    let (mut t, clock) = tracker(TimerMode::Manual);

    t.start_segment(1);
    clock.set_secs(2.0);
    t.start_manual_timer(1);
    clock.set_secs(5.0);
    t.pause_manual_timer(1);

    clock.set_secs(9.0);
    t.start_segment(1);

    assert_eq!(t.session(1).unwrap().pause_time, Some(clock_at(5.0)));
}

#[test]
fn minimum_view_time_gates_manual_start() {
    let (mut t, clock) = tracker(TimerMode::Manual);

    t.start_segment(1);
    assert!(!t.can_start_manual_timer(1));
    assert_eq!(t.remaining_view_wait(1), Some(2.0));

    clock.set_secs(1.5);
    assert_eq!(t.remaining_view_wait(1), Some(0.5));
    assert!(!t.can_start_manual_timer(1));

    clock.set_secs(2.0);
    assert!(t.can_start_manual_timer(1));
}

#[test]
fn manual_timer_calls_ignored_in_continuous_mode() {
    let (mut t, clock) = tracker(TimerMode::Continuous);

    t.start_segment(1);
    t.pause_manual_timer(1);
    assert_eq!(t.state(1), Some(SessionState::Running));
    assert!(!t.is_manual_timer_paused(1));

    clock.set_secs(3.0);
    assert_eq!(t.get_editing_time(1), 3.0);
}

#[test]
fn mode_is_locked_once_sessions_exist() {
    let (mut t, _clock) = tracker(TimerMode::Continuous);
    t.start_segment(1);

    assert!(t.set_mode(TimerMode::Continuous).is_ok());
    assert_eq!(
        t.set_mode(TimerMode::Manual),
        Err(Error::InvalidState(StateError::ModeLocked {
            current: TimerMode::Continuous,
            requested: TimerMode::Manual,
        }))
    );

    t.clear();
    assert!(t.set_mode(TimerMode::Manual).is_ok());
    assert_eq!(t.mode(), TimerMode::Manual);
}

#[test]
fn unset_mode_behaves_as_continuous_and_locks() {
    let clock = ManualClock::at_epoch();
    let mut t = TimeTracker::with_clock(TrackerConfig::default(), clock.clone());
    assert!(!t.mode_is_set());

    t.start_segment(1);
    assert_eq!(t.state(1), Some(SessionState::Running));
    assert!(t.set_mode(TimerMode::Manual).is_err());
}

#[test]
fn clock_skew_never_goes_negative() {
    let (mut t, clock) = tracker(TimerMode::Continuous);

    clock.set_secs(100.0);
    t.start_segment(1);

    clock.set_secs(90.0);
    t.update_activity(1);
    assert_eq!(active(&t, 1), 0.0);
    assert_eq!(t.session(1).unwrap().last_activity, clock_at(100.0));
    assert_eq!(t.get_editing_time(1), 0.0);

    clock.set_secs(110.0);
    t.update_activity(1);
    assert_eq!(active(&t, 1), 10.0);
}

#[test]
fn reset_manual_gates_pauses_everything() {
    let (mut t, clock) = tracker(TimerMode::Manual);

    for id in [1, 2] {
        t.start_segment(id);
    }
    clock.set_secs(3.0);
    t.start_manual_timer(2);

    t.reset_manual_gates();
    for id in [1, 2] {
        assert!(t.is_manual_timer_paused(id));
        assert_eq!(t.session(id).unwrap().segment_view_time, None);
        assert!(!t.can_start_manual_timer(id));
    }

    // Showing again restarts the view wait.
    t.start_segment(2);
    assert_eq!(t.remaining_view_wait(2), Some(2.0));
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Activity,
    Pause,
    Resume,
    ManualStart,
    ManualPause,
    Reenter,
    Restore,
}

fn apply(mut t: TimeTracker<ManualClock>, clock: &ManualClock, step: Step) -> TimeTracker<ManualClock> {
    match step {
        Step::Activity => t.update_activity(1),
        Step::Pause => t.pause_segment(1),
        Step::Resume => t.resume_segment(1),
        Step::ManualStart => {
            if t.can_start_manual_timer(1) {
                t.start_manual_timer(1);
            }
        }
        Step::ManualPause => t.pause_manual_timer(1),
        Step::Reenter => t.start_segment(1),
        Step::Restore => {
            let json = t.to_json().unwrap();
            let now = t.now();
            t = TimeTracker::from_json(&json, None, TrackerConfig::default(), clock.clone()).unwrap();
            t.suspend_at(Some(now));
            t.reset_manual_gates();
        }
    }
    t
}

#[test]
fn accounted_time_never_exceeds_unpaused_wall_time() {
    use Step::*;

    let steps = [
        (3.0, ManualStart),
        (4.0, Activity),
        (41.0, Activity),
        (3.0, Pause),
        (12.0, Resume),
        (2.0, Restore),
        (20.0, Reenter),
        (5.0, Resume),
        (7.0, ManualStart),
        (70.0, Activity),
        (40.0, Pause),
        (12.0, Restore),
        (3.0, Resume),
        (31.0, ManualPause),
        (9.0, ManualStart),
        (29.0, Activity),
        (60.0, Restore),
        (4.0, Activity),
        (15.0, Reenter),
        (2.0, ManualStart),
        (31.0, Activity),
        (6.0, Pause),
    ];

    for mode in [TimerMode::Continuous, TimerMode::Manual] {
        let (mut t, clock) = tracker(mode);
        t.start_segment(1);

        let mut now = 0.0;
        for (dt, step) in steps {
            now += dt;
            clock.set_secs(now);
            t = apply(t, &clock, step);

            let s = t.session(1).unwrap();
            let accounted = t.get_editing_time(1) + t.idle_time(1) + t.pending_idle(1);
            let bound = now - s.paused_total(t.now());
            assert!(
                accounted <= bound + 1e-9,
                "{mode}: accounted {accounted} > bound {bound} after {step:?} at t={now}"
            );
        }
    }
}

fn clock_at(secs: f64) -> DateTime<Utc> {
    let c = ManualClock::at_epoch();
    c.set_secs(secs);
    c.now()
}
