//! Five-level triage classification.
//!
//! | Level | Variant       | Typical meaning        | Wait (min) |
//! |-------|---------------|------------------------|------------|
//! | 1     | Resuscitation | Immediate life-saving  | 0          |
//! | 2     | Emergent      | Emergent, high risk    | 15         |
//! | 3     | Urgent        | Urgent but stable      | 60         |
//! | 4     | LessUrgent    | Less urgent            | 120        |
//! | 5     | NonUrgent     | Non-urgent             | 240        |
//!
//! This is a generic parametric ladder, not an implementation of any
//! proprietary triage protocol.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TriageError;
use crate::params::Thresholds;

/// Discrete triage level; 1 is the most urgent.
///
/// Ordering follows the level number, so `Resuscitation < NonUrgent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Level {
    Resuscitation = 1,
    Emergent = 2,
    Urgent = 3,
    LessUrgent = 4,
    NonUrgent = 5,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Resuscitation,
        Level::Emergent,
        Level::Urgent,
        Level::LessUrgent,
        Level::NonUrgent,
    ];

    /// Map a normalised score onto the threshold ladder.
    ///
    /// Bands are closed at their lower bound, so a score equal to a
    /// threshold goes to the more urgent side.
    pub fn from_score(score: f64, thresholds: &Thresholds) -> Level {
        if score >= thresholds.t1 {
            Level::Resuscitation
        } else if score >= thresholds.t2 {
            Level::Emergent
        } else if score >= thresholds.t3 {
            Level::Urgent
        } else if score >= thresholds.t4 {
            Level::LessUrgent
        } else {
            Level::NonUrgent
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::Resuscitation => "Resuscitation",
            Level::Emergent => "Emergent",
            Level::Urgent => "Urgent",
            Level::LessUrgent => "Less urgent",
            Level::NonUrgent => "Non-urgent",
        }
    }

    pub fn short_code(self) -> &'static str {
        match self {
            Level::Resuscitation => "R",
            Level::Emergent => "E",
            Level::Urgent => "U",
            Level::LessUrgent => "L",
            Level::NonUrgent => "N",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Level::Resuscitation => "Requires immediate life-saving intervention; do not delay.",
            Level::Emergent => "High risk; should be seen within 15 minutes.",
            Level::Urgent => "Urgent but stable; target within 60 minutes.",
            Level::LessUrgent => "Less urgent; target within 120 minutes.",
            Level::NonUrgent => "Non-urgent; target within 240 minutes.",
        }
    }

    /// Suggested maximum wait. Guidance only; local protocol overrides.
    pub fn wait_time_minutes(self) -> u32 {
        match self {
            Level::Resuscitation => 0,
            Level::Emergent => 15,
            Level::Urgent => 60,
            Level::LessUrgent => 120,
            Level::NonUrgent => 240,
        }
    }

    pub fn recommended_actions(self) -> &'static [&'static str] {
        match self {
            Level::Resuscitation => &[
                "Immediate assessment",
                "Life-saving interventions as indicated",
                "Continuous monitoring",
            ],
            Level::Emergent => &[
                "Rapid assessment",
                "Stabilisation",
                "Re-evaluate within 15 min",
            ],
            Level::Urgent => &[
                "Assessment within 60 min",
                "Routine monitoring",
                "Re-evaluate as needed",
            ],
            Level::LessUrgent => &[
                "Assessment within 120 min",
                "Routine care",
                "Re-evaluate if condition changes",
            ],
            Level::NonUrgent => &[
                "Assessment within 240 min",
                "Routine care",
                "May use fast-track if available",
            ],
        }
    }

    /// Levels 1 and 2.
    pub fn is_high_acuity(self) -> bool {
        matches!(self, Level::Resuscitation | Level::Emergent)
    }

    /// Levels 4 and 5.
    pub fn is_low_acuity(self) -> bool {
        matches!(self, Level::LessUrgent | Level::NonUrgent)
    }

    pub fn more_acute_than(self, other: Level) -> bool {
        self < other
    }

    pub fn less_acute_than(self, other: Level) -> bool {
        self > other
    }

    /// Absolute difference in level number (0..=4).
    pub fn distance(self, other: Level) -> u8 {
        self.as_u8().abs_diff(other.as_u8())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.as_u8()
    }
}

impl TryFrom<u8> for Level {
    type Error = TriageError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Level::Resuscitation),
            2 => Ok(Level::Emergent),
            3 => Ok(Level::Urgent),
            4 => Ok(Level::LessUrgent),
            5 => Ok(Level::NonUrgent),
            other => Err(TriageError::InvalidLevel(other.to_string())),
        }
    }
}

impl FromStr for Level {
    type Err = TriageError;

    /// Accepts the level number, its label (any case) or its short code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(number) = trimmed.parse::<u8>() {
            return Level::try_from(number);
        }
        Level::ALL
            .into_iter()
            .find(|level| {
                level.label().eq_ignore_ascii_case(trimmed)
                    || level.short_code().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| TriageError::InvalidLevel(s.to_string()))
    }
}

/// Number of occurrences of each level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    counts: [usize; 5],
}

impl LevelCounts {
    pub fn from_levels<I>(levels: I) -> Self
    where
        I: IntoIterator<Item = Level>,
    {
        let mut counts = Self::default();
        for level in levels {
            counts.add(level);
        }
        counts
    }

    pub fn add(&mut self, level: Level) {
        self.counts[usize::from(level.as_u8() - 1)] += 1;
    }

    pub fn get(&self, level: Level) -> usize {
        self.counts[usize::from(level.as_u8() - 1)]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Share of each level in [`Level::ALL`] order; all zero when empty.
    pub fn proportions(&self) -> [f64; 5] {
        let total = self.total();
        if total == 0 {
            return [0.0; 5];
        }
        self.counts.map(|count| count as f64 / total as f64)
    }

    pub fn high_acuity(&self) -> usize {
        self.get(Level::Resuscitation) + self.get(Level::Emergent)
    }

    pub fn low_acuity(&self) -> usize {
        self.get(Level::LessUrgent) + self.get(Level::NonUrgent)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Level, usize)> + '_ {
        Level::ALL.iter().map(move |level| (*level, self.get(*level)))
    }
}
