// Author: Dustin Pilgrim
// License: MIT

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Timer policy for the whole tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimerMode {
    /// Sessions accrue time automatically while visible.
    #[default]
    Continuous,
    /// "PET" mode: sessions start gated and the translator starts/pauses explicitly.
    Manual,
}

impl TimerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Continuous => "continuous",
            TimerMode::Manual => "manual",
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, TimerMode::Manual)
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown timer mode '{}' (expected continuous, current, manual or pet)",
            self.0
        )
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for TimerMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continuous" | "current" => Ok(TimerMode::Continuous),
            "manual" | "pet" => Ok(TimerMode::Manual),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

impl Serialize for TimerMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TimerMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
