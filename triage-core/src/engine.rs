//! Scoring engine bound to one immutable parameter set.
//!
//! | Method                  | Returns                    |
//! |-------------------------|----------------------------|
//! | `acuity`                | score in `[0, 1]`          |
//! | `level`                 | [`Level`]                  |
//! | `score_and_level`       | `(score, level)`           |
//! | `evaluate`              | [`Evaluation`]             |
//! | `breakdown`             | [`ScoreBreakdown`]         |
//! | `*_with_ranges`         | same, with per-call ranges |
//! | `batch_*`               | index-aligned `Vec`s       |
//! | `par_batch_evaluate`    | same as `batch_evaluate`, on the rayon pool |

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::TriageError;
use crate::level::{Level, LevelCounts};
use crate::params::{Params, Preset};
use crate::ranges::ReferenceRanges;
use crate::score::ScoreBreakdown;
use crate::validate::clamp_resource_count;
use crate::vitals::Vitals;

/// Evaluates acuity and level for a fixed [`Params`] and [`ReferenceRanges`].
///
/// The engine owns both by value and exposes them only by shared reference,
/// so it can be put behind `&` or `Arc` and scored from many threads. It
/// does not validate its parameters; check them with [`Params::validate`]
/// before building one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Engine {
    params: Params,
    ranges: ReferenceRanges,
}

/// Score and level of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub acuity: f64,
    pub level: Level,
}

impl Engine {
    /// Engine scoring against the adult reference ranges.
    pub fn new(params: Params) -> Self {
        Self::with_ranges(params, ReferenceRanges::adult())
    }

    pub fn with_ranges(params: Params, ranges: ReferenceRanges) -> Self {
        Self { params, ranges }
    }

    pub fn from_preset(preset: Preset) -> Self {
        Self::new(preset.params())
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn ranges(&self) -> &ReferenceRanges {
        &self.ranges
    }

    /// New engine with other parameters and the same ranges. `self` is unchanged.
    pub fn with_params(&self, params: Params) -> Self {
        Self::with_ranges(params, self.ranges)
    }

    pub fn acuity(&self, vitals: &Vitals, resource_count: i32) -> f64 {
        self.breakdown(vitals, resource_count).score
    }

    pub fn level(&self, vitals: &Vitals, resource_count: i32) -> Level {
        self.evaluate(vitals, resource_count).level
    }

    pub fn score_and_level(&self, vitals: &Vitals, resource_count: i32) -> (f64, Level) {
        let evaluation = self.evaluate(vitals, resource_count);
        (evaluation.acuity, evaluation.level)
    }

    pub fn evaluate(&self, vitals: &Vitals, resource_count: i32) -> Evaluation {
        self.evaluate_with_ranges(vitals, resource_count, &self.ranges)
    }

    pub fn breakdown(&self, vitals: &Vitals, resource_count: i32) -> ScoreBreakdown {
        ScoreBreakdown::compute(vitals, resource_count, &self.params, &self.ranges)
    }

    /// Score against `ranges` instead of the engine's own, e.g. for calibration runs.
    pub fn acuity_with_ranges(
        &self,
        vitals: &Vitals,
        resource_count: i32,
        ranges: &ReferenceRanges,
    ) -> f64 {
        ScoreBreakdown::compute(vitals, resource_count, &self.params, ranges).score
    }

    pub fn evaluate_with_ranges(
        &self,
        vitals: &Vitals,
        resource_count: i32,
        ranges: &ReferenceRanges,
    ) -> Evaluation {
        let acuity = self.acuity_with_ranges(vitals, resource_count, ranges);
        Evaluation {
            acuity,
            level: self.params.level_for(acuity),
        }
    }

    /// Clamp `resource_count` to `[0, max_resources]` before scoring.
    pub fn score_and_level_with_resource_clamp(
        &self,
        vitals: &Vitals,
        resource_count: i32,
    ) -> (f64, Level) {
        let clamped = clamp_resource_count(resource_count, self.params.max_resources);
        self.score_and_level(vitals, clamped)
    }

    /// One [`Evaluation`] per `(vitals[i], resource_counts[i])`.
    pub fn batch_evaluate(
        &self,
        vitals: &[Vitals],
        resource_counts: &[i32],
    ) -> Result<Vec<Evaluation>, TriageError> {
        check_lengths(vitals, resource_counts)?;
        tracing::debug!(items = vitals.len(), "batch evaluation");
        Ok(vitals
            .iter()
            .zip(resource_counts)
            .map(|(v, count)| self.evaluate(v, *count))
            .collect())
    }

    /// Same as [`Engine::batch_evaluate`], spread over the rayon thread pool.
    /// Output order matches input order.
    pub fn par_batch_evaluate(
        &self,
        vitals: &[Vitals],
        resource_counts: &[i32],
    ) -> Result<Vec<Evaluation>, TriageError> {
        check_lengths(vitals, resource_counts)?;
        tracing::debug!(items = vitals.len(), "parallel batch evaluation");
        Ok(vitals
            .par_iter()
            .zip(resource_counts.par_iter())
            .map(|(v, count)| self.evaluate(v, *count))
            .collect())
    }

    pub fn batch_acuity(
        &self,
        vitals: &[Vitals],
        resource_counts: &[i32],
    ) -> Result<Vec<f64>, TriageError> {
        let evaluations = self.batch_evaluate(vitals, resource_counts)?;
        Ok(evaluations.iter().map(|e| e.acuity).collect())
    }

    pub fn batch_level(
        &self,
        vitals: &[Vitals],
        resource_counts: &[i32],
    ) -> Result<Vec<Level>, TriageError> {
        let evaluations = self.batch_evaluate(vitals, resource_counts)?;
        Ok(evaluations.iter().map(|e| e.level).collect())
    }

    /// Parallel scores and levels as two index-aligned vectors.
    pub fn batch_score_and_level(
        &self,
        vitals: &[Vitals],
        resource_counts: &[i32],
    ) -> Result<(Vec<f64>, Vec<Level>), TriageError> {
        let evaluations = self.batch_evaluate(vitals, resource_counts)?;
        Ok(evaluations.iter().map(|e| (e.acuity, e.level)).unzip())
    }
}

fn check_lengths(vitals: &[Vitals], resource_counts: &[i32]) -> Result<(), TriageError> {
    if vitals.len() == resource_counts.len() {
        return Ok(());
    }
    tracing::warn!(
        vitals = vitals.len(),
        resource_counts = resource_counts.len(),
        "batch inputs differ in length"
    );
    Err(TriageError::BatchLengthMismatch {
        vitals: vitals.len(),
        resource_counts: resource_counts.len(),
    })
}

pub fn count_by_level(results: &[Evaluation], level: Level) -> usize {
    results.iter().filter(|r| r.level == level).count()
}

/// Mean acuity; 0 for an empty slice.
pub fn mean_acuity(results: &[Evaluation]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().map(|r| r.acuity).sum::<f64>() / results.len() as f64
}

/// Lowest acuity; 0 for an empty slice.
pub fn min_acuity(results: &[Evaluation]) -> f64 {
    results
        .iter()
        .map(|r| r.acuity)
        .reduce(f64::min)
        .unwrap_or(0.0)
}

/// Highest acuity; 0 for an empty slice.
pub fn max_acuity(results: &[Evaluation]) -> f64 {
    results
        .iter()
        .map(|r| r.acuity)
        .reduce(f64::max)
        .unwrap_or(0.0)
}

pub fn filter_by_level(results: &[Evaluation], level: Level) -> Vec<Evaluation> {
    results.iter().copied().filter(|r| r.level == level).collect()
}

/// Levels 1 and 2.
pub fn filter_high_acuity(results: &[Evaluation]) -> Vec<Evaluation> {
    results
        .iter()
        .copied()
        .filter(|r| r.level.is_high_acuity())
        .collect()
}

/// Levels 4 and 5.
pub fn filter_low_acuity(results: &[Evaluation]) -> Vec<Evaluation> {
    results
        .iter()
        .copied()
        .filter(|r| r.level.is_low_acuity())
        .collect()
}

impl LevelCounts {
    pub fn from_evaluations(results: &[Evaluation]) -> Self {
        Self::from_levels(results.iter().map(|r| r.level))
    }
}

/// Min, max and mean acuity over a set of evaluations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AcuityStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub n: usize,
}

impl AcuityStats {
    pub fn from_evaluations(results: &[Evaluation]) -> Self {
        if results.is_empty() {
            return Self::default();
        }
        Self {
            min: min_acuity(results),
            max: max_acuity(results),
            mean: mean_acuity(results),
            n: results.len(),
        }
    }
}
