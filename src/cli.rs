// Author: Dustin Pilgrim
// License: MIT

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use petrack::TimerMode;

#[derive(Parser, Debug)]
#[command(
    name = "petrack",
    version = env!("CARGO_PKG_VERSION"),
    about = "Editing-time tracker for machine translation post-editing"
)]
pub struct Args {
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(short, long, action)]
    pub verbose: bool,

    /// Also write log lines to FILE (the cache log when no FILE is given)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(about = "Replay a JSON-lines event journal through a workbench")]
    Replay {
        journal: PathBuf,

        /// Timer mode for the session (continuous, manual)
        #[arg(long)]
        mode: Option<TimerMode>,

        /// Write the resulting progress to FILE
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    #[command(about = "Summarize saved progress")]
    Info {
        progress: PathBuf,

        /// Evaluate running timers at this instant instead of the save time
        #[arg(long, value_name = "RFC3339")]
        at: Option<DateTime<Utc>>,

        #[arg(long)]
        json: bool,
    },

    #[command(about = "Show the word-level changes between two texts")]
    Diff {
        original: String,
        edited: String,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Replay { .. } => "replay",
            Command::Info { .. } => "info",
            Command::Diff { .. } => "diff",
        }
    }
}
