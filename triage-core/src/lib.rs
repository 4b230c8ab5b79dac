//! Parametric acuity scoring and five-level triage classification.
//!
//! The crate turns one set of vital signs plus an expected resource count into
//! a normalised acuity score in `[0, 1]`, then maps the score onto a triage
//! [`Level`] by comparing it against four ordered thresholds. Everything here
//! is a pure computation over value types; an [`Engine`] can be shared
//! read-only across any number of threads.

pub mod engine;
pub mod error;
pub mod level;
pub mod params;
pub mod ranges;
pub mod score;
pub mod validate;
pub mod vitals;

pub use engine::{AcuityStats, Engine, Evaluation};
pub use error::TriageError;
pub use level::{Level, LevelCounts};
pub use params::{Params, ParamsOverride, Preset, Thresholds, VitalWeights};
pub use ranges::{ReferenceRange, ReferenceRanges};
pub use score::ScoreBreakdown;
pub use vitals::{deviation, VitalSign, Vitals};
