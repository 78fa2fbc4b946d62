//! Score aggregation
//!
//! A pure reducer over inspection and miss outcomes.

use serde::{Deserialize, Serialize};

/// Scoreboard counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    /// Items inspected and found safe
    pub safe_count: u32,
    /// Malicious items caught by inspection
    pub caught_count: u32,
    /// Malicious items that crossed the line uninspected (manual mode only)
    pub missed_count: u32,
}

/// Outcomes the scoreboard reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreEvent {
    /// Inspection revealed a safe item
    Cleared,
    /// Inspection revealed a malicious item
    Caught,
    /// A malicious item slipped past while not on autopilot
    Missed,
    /// Autopilot switched on: the missed counter starts over
    AutopilotEngaged,
}

impl Score {
    /// Fold one event into the score. All counters are non-decreasing except
    /// `missed_count`, which only resets on `AutopilotEngaged`.
    #[must_use]
    pub fn apply(self, event: ScoreEvent) -> Self {
        match event {
            ScoreEvent::Cleared => Self {
                safe_count: self.safe_count.saturating_add(1),
                ..self
            },
            ScoreEvent::Caught => Self {
                caught_count: self.caught_count.saturating_add(1),
                ..self
            },
            ScoreEvent::Missed => Self {
                missed_count: self.missed_count.saturating_add(1),
                ..self
            },
            ScoreEvent::AutopilotEngaged => Self {
                missed_count: 0,
                ..self
            },
        }
    }

    /// Total items inspected
    pub fn inspected(&self) -> u32 {
        self.safe_count + self.caught_count
    }
}
