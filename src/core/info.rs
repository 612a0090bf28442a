// Author: Dustin Pilgrim
// License: MIT

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::{
    clock::Clock,
    metrics::EditMetrics,
    mode::TimerMode,
    session::SegmentId,
    utils::format_duration,
    workbench::Workbench,
};

/// Timing summary for one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentReport {
    pub segment: SegmentId,
    pub state: &'static str,
    pub editing_seconds: f64,
    pub idle_seconds: f64,
    pub paused_seconds: f64,
    pub manual_gate: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub insertions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletions: Option<usize>,
}

/// Returned for `petrack info`.
///
/// - the serialized fields are the JSON contract (`--json`).
/// - `pretty_text` is the human-facing rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressReport {
    pub mode: TimerMode,
    pub generated_at: DateTime<Utc>,
    pub segments: Vec<SegmentReport>,
    pub total_editing_seconds: f64,
    pub total_idle_seconds: f64,

    #[serde(skip_serializing)]
    pub pretty_text: String,
}

impl<C: Clock> Workbench<C> {
    pub fn report(&self) -> ProgressReport {
        let tracker = self.tracker();
        let now = tracker.now();
        let mode = tracker.mode();

        let segments: Vec<SegmentReport> = tracker
            .sessions()
            .map(|(id, session)| {
                let metrics: Option<&EditMetrics> = self.metrics_for(id);
                SegmentReport {
                    segment: id,
                    state: session.state(mode).as_str(),
                    editing_seconds: tracker.get_editing_time(id),
                    idle_seconds: tracker.idle_time(id),
                    paused_seconds: session.paused_total(now),
                    manual_gate: tracker.is_manual_timer_paused(id),
                    insertions: metrics.map(|m| m.insertions),
                    deletions: metrics.map(|m| m.deletions),
                }
            })
            .collect();

        let total_editing_seconds = segments.iter().map(|s| s.editing_seconds).sum();
        let total_idle_seconds = segments.iter().map(|s| s.idle_seconds).sum();

        let mut report = ProgressReport {
            mode,
            generated_at: now,
            segments,
            total_editing_seconds,
            total_idle_seconds,
            pretty_text: String::new(),
        };
        report.pretty_text = render_report(&report);
        report
    }
}

pub fn render_report(report: &ProgressReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("Mode:     {}\n", report.mode));
    out.push_str(&format!(
        "Segments: {}\n",
        report.segments.len()
    ));
    out.push_str(&format!(
        "Editing:  {}\n",
        format_duration(report.total_editing_seconds)
    ));
    out.push_str(&format!(
        "Idle:     {}\n",
        format_duration(report.total_idle_seconds)
    ));

    if report.segments.is_empty() {
        return out;
    }

    out.push('\n');
    for s in &report.segments {
        let mut line = format!(
            "  #{:<4} {:<16} edit {:<8} idle {:<8} paused {}",
            s.segment,
            s.state,
            format_duration(s.editing_seconds),
            format_duration(s.idle_seconds),
            format_duration(s.paused_seconds),
        );
        if let (Some(ins), Some(del)) = (s.insertions, s.deletions) {
            line.push_str(&format!("  +{} -{}", ins, del));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::config::TrackerConfig;
    use crate::core::events::Event;
    use crate::core::tracker::TimeTracker;

    #[test]
    fn report_sums_segments_and_renders() {
        let clock = ManualClock::at_epoch();
        let tracker = TimeTracker::with_clock(TrackerConfig::default(), clock.clone());
        let mut wb = Workbench::new(tracker);

        wb.handle_event(Event::ShowSegment { id: 0 }).unwrap();
        clock.advance_secs(5.0);
        wb.handle_event(Event::UserActivity { id: 0 }).unwrap();
        wb.handle_event(Event::Navigate {
            from: 0,
            to: 1,
            source: "Hallo Welt".into(),
            original: "Hello world".into(),
            edited: "Hello there world".into(),
        })
        .unwrap();
        clock.advance_secs(70.0);

        let report = wb.report();
        assert_eq!(report.segments.len(), 2);
        assert_eq!(report.segments[0].insertions, Some(1));
        assert_eq!(report.segments[0].state, "paused");
        assert_eq!(report.segments[1].state, "running");
        // 5s on segment 0, 30 active of the 70s gap on segment 1.
        assert_eq!(report.total_editing_seconds, 35.0);

        assert!(report.pretty_text.contains("Mode:     continuous"));
        assert!(report.pretty_text.contains("Editing:  35s"));
        assert!(report.pretty_text.contains("+1 -0"));
    }
}
