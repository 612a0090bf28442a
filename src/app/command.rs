// Author: Dustin Pilgrim
// License: MIT

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use eyre::WrapErr;

use petrack::{
    Action, ManualClock, Progress, TimeTracker, TimerMode, TrackerConfig, Workbench,
    config::load_config,
    core::{metrics::{render_changes, word_changes}, utils::format_duration},
    pdebug, pinfo, pwarn,
};

use crate::app::journal::parse_journal;
use crate::cli::{Args, Command};

pub fn run(args: Args) -> eyre::Result<()> {
    match &args.command {
        Command::Replay {
            journal,
            mode,
            save,
            json,
        } => {
            let cfg = tracker_config(&args)?;
            replay(journal, *mode, save.as_deref(), *json, cfg)
        }

        Command::Info { progress, at, json } => {
            let cfg = tracker_config(&args)?;
            info(progress, *at, *json, cfg)
        }

        Command::Diff { original, edited } => {
            let (insertions, deletions) = word_changes(original, edited);
            println!("{}", render_changes(original, edited));
            println!("+{} -{}", insertions, deletions);
            Ok(())
        }
    }
}

fn tracker_config(args: &Args) -> eyre::Result<TrackerConfig> {
    load_config(args.config.as_deref()).wrap_err("failed to load configuration")
}

fn replay(
    journal: &Path,
    mode: Option<TimerMode>,
    save: Option<&Path>,
    json: bool,
    cfg: TrackerConfig,
) -> eyre::Result<()> {
    let text = fs::read_to_string(journal)
        .wrap_err_with(|| format!("failed to read journal {}", journal.display()))?;
    let entries = parse_journal(&text)
        .wrap_err_with(|| format!("failed to parse journal {}", journal.display()))?;

    let clock = ManualClock::new(entries[0].at);
    let mut tracker = TimeTracker::with_clock(cfg, clock.clone());
    if let Some(mode) = mode {
        tracker.set_mode(mode)?;
    }
    let mut workbench = Workbench::new(tracker);

    let mut last = entries[0].at;
    for entry in entries {
        if entry.at < last {
            pwarn!("Replay", "journal goes back in time at {}", entry.at);
        }
        last = last.max(entry.at);
        clock.set(entry.at);

        let name = entry.event.name();
        match workbench.handle_event(entry.event) {
            Ok(actions) => {
                for action in actions {
                    emit_action(&action, entry.at, json)?;
                    if action == Action::PersistProgress {
                        if let Some(path) = save {
                            write_progress(&workbench, path)?;
                        }
                    }
                }
            }
            Err(e) => {
                pwarn!("Replay", "{} rejected: {}", name, e);
                if json {
                    let line = serde_json::json!({
                        "at": entry.at,
                        "rejected": name,
                        "reason": e.to_string(),
                    });
                    println!("{}", line);
                } else {
                    println!("{}  rejected {}: {}", entry.at.format("%H:%M:%S"), name, e);
                }
            }
        }
    }

    if let Some(path) = save {
        write_progress(&workbench, path)?;
        pinfo!("Replay", "progress saved to {}", path.display());
    }

    print_report(&workbench, json)
}

fn emit_action(action: &Action, at: DateTime<Utc>, json: bool) -> eyre::Result<()> {
    if json {
        let mut value = serde_json::to_value(action).wrap_err("failed to encode action")?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("at".into(), serde_json::to_value(at)?);
        }
        println!("{}", value);
        return Ok(());
    }

    let when = at.format("%H:%M:%S");
    match action {
        Action::SegmentActivated {
            segment,
            timer_gated,
        } => {
            if *timer_gated {
                println!("{}  segment {} shown (timer paused)", when, segment);
            } else {
                println!("{}  segment {} shown", when, segment);
            }
        }
        Action::IdleWarning {
            segment,
            idle_seconds,
        } => println!(
            "{}  segment {} idle for {}",
            when,
            segment,
            format_duration(*idle_seconds as f64)
        ),
        Action::PersistProgress => pdebug!("Replay", "progress checkpoint at {}", when),
    }
    Ok(())
}

fn write_progress<C: petrack::Clock>(workbench: &Workbench<C>, path: &Path) -> eyre::Result<()> {
    let text = workbench
        .progress()
        .to_json()
        .wrap_err("failed to encode progress")?;
    fs::write(path, text).wrap_err_with(|| format!("failed to write {}", path.display()))
}

fn info(
    path: &Path,
    at: Option<DateTime<Utc>>,
    json: bool,
    cfg: TrackerConfig,
) -> eyre::Result<()> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read progress {}", path.display()))?;
    let progress = Progress::from_json(&text)
        .wrap_err_with(|| format!("failed to parse progress {}", path.display()))?;

    let at = at.or(progress.saved_at).unwrap_or_else(Utc::now);
    let workbench = Workbench::restore(progress, cfg, ManualClock::new(at))
        .wrap_err_with(|| format!("failed to restore progress {}", path.display()))?;

    print_report(&workbench, json)
}

fn print_report<C: petrack::Clock>(workbench: &Workbench<C>, json: bool) -> eyre::Result<()> {
    let report = workbench.report();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).wrap_err("failed to encode report")?
        );
    } else {
        print!("{}", report.pretty_text);
    }
    Ok(())
}
