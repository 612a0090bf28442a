// Author: Dustin Pilgrim
// License: MIT

use chrono::{DateTime, Utc};
use eyre::{WrapErr, eyre};
use serde::Deserialize;

use petrack::Event;

/// One line of a replay journal: `{"at": "<RFC3339>", "event": {...}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JournalEntry {
    pub at: DateTime<Utc>,
    pub event: Event,
}

/// Parses a JSON-lines journal. Blank lines are skipped.
pub fn parse_journal(text: &str) -> eyre::Result<Vec<JournalEntry>> {
    let mut entries = Vec::new();

    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let entry: JournalEntry = serde_json::from_str(line)
            .wrap_err_with(|| format!("line {}: invalid journal entry", n + 1))?;
        entries.push(entry);
    }

    if entries.is_empty() {
        return Err(eyre!("journal has no entries"));
    }
    Ok(entries)
}
