// Author: Dustin Pilgrim
// License: MIT

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

use crate::core::session::SegmentId;

static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[[:punct:]]").expect("punctuation class is a valid pattern"));

/// What the translator did to one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditMetrics {
    pub segment_id: SegmentId,
    pub source: String,
    pub original: String,
    pub edited: String,
    /// Active editing seconds at submission.
    pub edit_time: f64,
    pub insertions: usize,
    pub deletions: usize,
}

impl EditMetrics {
    pub fn record(
        segment_id: SegmentId,
        source: impl Into<String>,
        original: impl Into<String>,
        edited: impl Into<String>,
        edit_time: f64,
    ) -> Self {
        let original = original.into();
        let edited = edited.into();
        let (insertions, deletions) = word_changes(&original, &edited);

        Self {
            segment_id,
            source: source.into(),
            original,
            edited,
            edit_time,
            insertions,
            deletions,
        }
    }

    pub fn changed(&self) -> bool {
        self.original != self.edited
    }
}

/// Words of `text` with ASCII punctuation removed.
pub fn words(text: &str) -> Vec<String> {
    PUNCTUATION
        .replace_all(text, "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Inserted and deleted words between `original` and `edited`.
/// Punctuation-only edits do not count.
pub fn word_changes(original: &str, edited: &str) -> (usize, usize) {
    let old = words(original);
    let new = words(edited);
    let old: Vec<&str> = old.iter().map(String::as_str).collect();
    let new: Vec<&str> = new.iter().map(String::as_str).collect();

    let diff = TextDiff::from_slices(&old, &new);

    let mut insertions = 0;
    let mut deletions = 0;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => insertions += 1,
            ChangeTag::Delete => deletions += 1,
            ChangeTag::Equal => {}
        }
    }
    (insertions, deletions)
}

/// Word diff rendered as `[-removed-]` / `{+added+}` markers.
pub fn render_changes(original: &str, edited: &str) -> String {
    let old = words(original);
    let new = words(edited);
    let old: Vec<&str> = old.iter().map(String::as_str).collect();
    let new: Vec<&str> = new.iter().map(String::as_str).collect();

    TextDiff::from_slices(&old, &new)
        .iter_all_changes()
        .map(|change| match change.tag() {
            ChangeTag::Equal => change.value().to_string(),
            ChangeTag::Delete => format!("[-{}-]", change.value()),
            ChangeTag::Insert => format!("{{+{}+}}", change.value()),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
