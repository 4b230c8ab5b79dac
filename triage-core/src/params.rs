//! Tunable parameters for acuity scoring and level assignment.
//!
//! | Field           | Valid range                                  |
//! |-----------------|----------------------------------------------|
//! | vital_weights   | each in `[0, 1]`, order HR RR SBP DBP Temp SpO2 GCS |
//! | max_resources   | `>= 0`                                       |
//! | resource_weight | `>= 0`                                       |
//! | thresholds      | `1 >= t1 > t2 > t3 > t4 > 0`                 |
//!
//! Nothing here validates on construction or mutation. Build the set you
//! want, then call [`Params::validate`] (or [`Params::validated`]) before
//! handing it to an [`Engine`](crate::Engine).

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TriageError;
use crate::level::Level;
use crate::validate::{validate_params, ParamsLike, ParamsReport};
use crate::vitals::VitalSign;

/// Per-vital weights, indexed by [`VitalSign`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VitalWeights(pub [f64; VitalSign::COUNT]);

impl Default for VitalWeights {
    fn default() -> Self {
        Self([0.18, 0.22, 0.16, 0.10, 0.08, 0.16, 0.10])
    }
}

impl VitalWeights {
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VitalSign, f64)> + '_ {
        VitalSign::ALL.iter().map(move |sign| (*sign, self[*sign]))
    }
}

impl Index<VitalSign> for VitalWeights {
    type Output = f64;

    fn index(&self, sign: VitalSign) -> &f64 {
        &self.0[sign.index()]
    }
}

impl IndexMut<VitalSign> for VitalWeights {
    fn index_mut(&mut self, sign: VitalSign) -> &mut f64 {
        &mut self.0[sign.index()]
    }
}

/// Lower score bounds of levels 1 through 4.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub t1: f64,
    pub t2: f64,
    pub t3: f64,
    pub t4: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new(0.85, 0.60, 0.35, 0.15)
    }
}

impl Thresholds {
    pub const fn new(t1: f64, t2: f64, t3: f64, t4: f64) -> Self {
        Self { t1, t2, t3, t4 }
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.t1, self.t2, self.t3, self.t4]
    }

    /// Strictly decreasing, positive and with `t1 <= 1`.
    pub fn is_ordered(&self) -> bool {
        self.t1 > self.t2 && self.t2 > self.t3 && self.t3 > self.t4 && self.t4 > 0.0 && self.t1 <= 1.0
    }
}

impl From<[f64; 4]> for Thresholds {
    fn from(t: [f64; 4]) -> Self {
        Self::new(t[0], t[1], t[2], t[3])
    }
}

/// The full configuration for one scoring run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub vital_weights: VitalWeights,
    pub max_resources: i32,
    pub resource_weight: f64,
    pub thresholds: Thresholds,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            vital_weights: VitalWeights::default(),
            max_resources: 6,
            resource_weight: 0.25,
            thresholds: Thresholds::default(),
        }
    }
}

impl Params {
    pub fn strict() -> Self {
        Preset::Strict.params()
    }

    pub fn lenient() -> Self {
        Preset::Lenient.params()
    }

    pub fn research() -> Self {
        Preset::Research.params()
    }

    /// Every weight in `[0, 1]`, non-negative resource parameters, ordered thresholds.
    pub fn validate(&self) -> bool {
        if self.max_resources < 0 || !self.resource_weight.is_finite() || self.resource_weight < 0.0 {
            return false;
        }
        if !self
            .vital_weights
            .0
            .iter()
            .all(|w| (0.0..=1.0).contains(w))
        {
            return false;
        }
        self.thresholds.is_ordered()
    }

    /// Same checks, run through the standalone validator so each failing
    /// field is reported.
    pub fn report(&self) -> ParamsReport {
        validate_params(&ParamsLike::from(self))
    }

    pub fn validate_external(&self) -> bool {
        self.report().valid
    }

    /// Consume the set if it validates.
    pub fn validated(self) -> Result<Self, TriageError> {
        if self.validate() {
            return Ok(self);
        }
        let report = self.report();
        tracing::warn!(%report, "rejected parameter set");
        Err(TriageError::InvalidParams(report))
    }

    pub fn weight_sum(&self) -> f64 {
        self.vital_weights.sum()
    }

    /// Normalisation denominator shared by every scoring call.
    pub fn divisor(&self) -> f64 {
        self.weight_sum() + self.resource_weight
    }

    pub fn level_for(&self, score: f64) -> Level {
        Level::from_score(score, &self.thresholds)
    }

    pub fn set_thresholds(&mut self, t1: f64, t2: f64, t3: f64, t4: f64) {
        self.thresholds = Thresholds::new(t1, t2, t3, t4);
    }

    pub fn set_all_thresholds(&mut self, thresholds: [f64; 4]) {
        self.thresholds = Thresholds::from(thresholds);
    }

    pub fn set_vital_weight(&mut self, sign: VitalSign, weight: f64) {
        self.vital_weights[sign] = weight;
    }

    pub fn copy_weights_from(&mut self, other: &Params) {
        self.vital_weights = other.vital_weights;
    }

    /// `[low, high)` score band of a level; level 1 tops out at 1.0, level 5
    /// starts at 0.0.
    pub fn threshold_for_level(&self, level: Level) -> (f64, f64) {
        let t = &self.thresholds;
        match level {
            Level::Resuscitation => (t.t1, 1.0),
            Level::Emergent => (t.t2, t.t1),
            Level::Urgent => (t.t3, t.t2),
            Level::LessUrgent => (t.t4, t.t3),
            Level::NonUrgent => (0.0, t.t4),
        }
    }

    /// Continuous level in `[1, 5]` for display or smoothing.
    ///
    /// Piecewise linear over the bands: `[t1, 1]` maps to `[1, 1.5]`, the
    /// next three bands to half-level steps up to 3, and `[0, t4)` stretches
    /// over `[3, 5]`. Discrete triage must use [`Level::from_score`].
    pub fn score_to_level_continuous(&self, score: f64) -> f64 {
        let t = &self.thresholds;
        let value = if score >= t.t1 {
            if t.t1 >= 1.0 {
                1.0
            } else {
                1.0 + (1.0 - score) / (1.0 - t.t1) * 0.5
            }
        } else if score >= t.t2 {
            1.5 + (t.t1 - score) / (t.t1 - t.t2) * 0.5
        } else if score >= t.t3 {
            2.0 + (t.t2 - score) / (t.t2 - t.t3) * 0.5
        } else if score >= t.t4 {
            2.5 + (t.t3 - score) / (t.t3 - t.t4) * 0.5
        } else if t.t4 > 0.0 {
            3.0 + (t.t4 - score) / t.t4 * 2.0
        } else {
            5.0
        };
        if value.is_nan() {
            return 5.0;
        }
        value.clamp(1.0, 5.0)
    }

    /// Multiply every weight by `factor`, then rescale so the largest is 1.
    /// No-op if `factor <= 0`.
    pub fn scale_weights(&mut self, factor: f64) {
        if factor <= 0.0 {
            return;
        }
        let mut max = 0.0_f64;
        for w in self.vital_weights.0.iter_mut() {
            *w *= factor;
            max = max.max(*w);
        }
        if max > 0.0 {
            for w in self.vital_weights.0.iter_mut() {
                *w /= max;
            }
        }
    }

    /// Rescale weights to sum to 1. No-op if the sum is not positive.
    pub fn normalize_weights(&mut self) {
        let sum = self.weight_sum();
        if sum <= 0.0 {
            return;
        }
        for w in self.vital_weights.0.iter_mut() {
            *w /= sum;
        }
    }

    /// Equal weight (1/7) for every vital; a baseline for calibration.
    pub fn uniform_weights(&mut self) {
        self.vital_weights = VitalWeights([1.0 / VitalSign::COUNT as f64; VitalSign::COUNT]);
    }

    /// Space the thresholds evenly in log space strictly between `min` and `max`.
    /// No-op unless `0 < min < max <= 1`.
    pub fn geometric_thresholds(&mut self, min: f64, max: f64) {
        if min <= 0.0 || max <= min || max > 1.0 {
            return;
        }
        let log_min = min.ln();
        let step = (max.ln() - log_min) / 5.0;
        let at = |k: f64| (log_min + k * step).exp();
        self.thresholds = Thresholds::new(at(4.0).min(1.0), at(3.0), at(2.0), at(1.0));
    }

    /// Every threshold lower than `other`'s, so more patients land in the
    /// urgent levels.
    pub fn is_stricter_than(&self, other: &Params) -> bool {
        let (a, b) = (self.thresholds.as_array(), other.thresholds.as_array());
        a.iter().zip(b.iter()).all(|(x, y)| x < y)
    }
}

impl From<&Params> for ParamsLike {
    fn from(params: &Params) -> Self {
        Self {
            vital_weights: params.vital_weights.0,
            max_resources: params.max_resources,
            resource_weight: params.resource_weight,
            thresholds: params.thresholds.as_array(),
        }
    }
}

/// Named, pre-validated parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Default,
    /// Lower thresholds; use when under-triage must be minimised.
    Strict,
    /// Higher thresholds; use when over-triage is a concern.
    Lenient,
    /// Equal level widths of 0.2 for balanced research cohorts.
    Research,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Default, Preset::Strict, Preset::Lenient, Preset::Research];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::Strict => "strict",
            Preset::Lenient => "lenient",
            Preset::Research => "research",
        }
    }

    pub fn params(self) -> Params {
        let base = Params::default();
        let thresholds = match self {
            Preset::Default => return base,
            Preset::Strict => Thresholds::new(0.80, 0.55, 0.30, 0.12),
            Preset::Lenient => Thresholds::new(0.90, 0.68, 0.42, 0.18),
            Preset::Research => Thresholds::new(0.80, 0.60, 0.40, 0.20),
        };
        Params { thresholds, ..base }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TriageError::UnknownPreset(s.to_string()))
    }
}

/// Partial parameter configuration, e.g. read from a JSON file.
///
/// Unset fields fall back to the chosen preset (or the default set).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamsOverride {
    pub preset: Option<Preset>,
    pub vital_weights: Option<VitalWeights>,
    pub max_resources: Option<i32>,
    pub resource_weight: Option<f64>,
    pub thresholds: Option<Thresholds>,
}

impl ParamsOverride {
    /// Apply on top of `base`; `preset`, if set, replaces `base` first.
    pub fn apply(&self, base: Params) -> Params {
        let mut params = self.preset.map(Preset::params).unwrap_or(base);
        if let Some(weights) = self.vital_weights {
            params.vital_weights = weights;
        }
        if let Some(max) = self.max_resources {
            params.max_resources = max;
        }
        if let Some(weight) = self.resource_weight {
            params.resource_weight = weight;
        }
        if let Some(thresholds) = self.thresholds {
            params.thresholds = thresholds;
        }
        params
    }

    pub fn into_params(self) -> Params {
        self.apply(Params::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        for preset in Preset::ALL {
            assert!(preset.params().validate(), "{preset} should validate");
            assert!(preset.params().validate_external(), "{preset} should validate externally");
        }
    }

    #[test]
    fn strict_is_stricter_than_lenient() {
        assert!(Params::strict().is_stricter_than(&Params::default()));
        assert!(Params::default().is_stricter_than(&Params::lenient()));
        assert!(!Params::lenient().is_stricter_than(&Params::strict()));
    }

    #[test]
    fn divisor_adds_resource_weight() {
        let params = Params::default();
        assert!((params.weight_sum() - 1.0).abs() < 1e-12);
        assert!((params.divisor() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let mut params = Params::default();
        params.max_resources = -1;
        assert!(!params.validate());

        let mut params = Params::default();
        params.resource_weight = -0.1;
        assert!(!params.validate());

        let mut params = Params::default();
        params.set_vital_weight(VitalSign::Gcs, 1.5);
        assert!(!params.validate());

        let mut params = Params::default();
        params.set_vital_weight(VitalSign::Temperature, f64::NAN);
        assert!(!params.validate());
        assert!(!params.validate_external());
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let mut params = Params::default();
        params.set_thresholds(0.5, 0.6, 0.35, 0.15);
        assert!(!params.validate());
        params.set_thresholds(1.2, 0.6, 0.35, 0.15);
        assert!(!params.validate());
        params.set_thresholds(0.85, 0.60, 0.35, 0.0);
        assert!(!params.validate());
        params.set_all_thresholds([0.85, 0.60, 0.35, 0.15]);
        assert!(params.validate());
    }

    #[test]
    fn validated_carries_report() {
        let mut params = Params::default();
        params.set_thresholds(0.5, 0.6, 0.35, 0.15);
        match params.validated() {
            Err(TriageError::InvalidParams(report)) => {
                assert!(!report.thresholds_ok);
                assert!(report.weights_ok);
            }
            other => panic!("expected InvalidParams, got {other:?}"),
        }
    }

    #[test]
    fn normalize_and_uniform_weights_sum_to_one() {
        let mut params = Params::default();
        params.scale_weights(3.0);
        assert!((params.vital_weights[VitalSign::RespiratoryRate] - 1.0).abs() < 1e-12);
        params.normalize_weights();
        assert!((params.weight_sum() - 1.0).abs() < 1e-12);
        params.uniform_weights();
        assert!((params.weight_sum() - 1.0).abs() < 1e-12);
        assert!((params.vital_weights[VitalSign::HeartRate] - 1.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn geometric_thresholds_are_ordered() {
        let mut params = Params::default();
        params.geometric_thresholds(0.1, 0.9);
        assert!(params.validate());
        let before = params.thresholds;
        params.geometric_thresholds(0.9, 0.1);
        assert_eq!(params.thresholds, before);
    }

    #[test]
    fn continuous_level_is_monotone_and_bounded() {
        let params = Params::default();
        let mut previous = 0.0;
        for step in (0..=100).rev() {
            let value = params.score_to_level_continuous(f64::from(step) / 100.0);
            assert!((1.0..=5.0).contains(&value));
            assert!(value >= previous);
            previous = value;
        }
        assert!((params.score_to_level_continuous(0.85) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn continuous_level_follows_band_segments() {
        let params = Params::default();
        let expected = [
            (1.0, 1.0),
            (0.9, 1.0 + 0.5 / 1.5),
            (0.7, 1.8),
            (0.6, 2.0),
            (0.5, 2.2),
            (0.35, 2.5),
            (0.2, 2.875),
            (0.15, 3.0),
            (0.05, 3.0 + 4.0 / 3.0),
            (0.0, 5.0),
        ];
        for (score, level) in expected {
            let value = params.score_to_level_continuous(score);
            assert!((value - level).abs() < 1e-9, "{score}: {value} != {level}");
        }
    }

    #[test]
    fn copy_weights_leaves_other_fields() {
        let mut params = Params::strict();
        let mut source = Params::default();
        source.uniform_weights();
        params.copy_weights_from(&source);
        assert_eq!(params.vital_weights, source.vital_weights);
        assert_eq!(params.thresholds, Params::strict().thresholds);
    }

    #[test]
    fn preset_parses_case_insensitively() {
        assert_eq!("Strict".parse::<Preset>().unwrap(), Preset::Strict);
        assert!(matches!("esi".parse::<Preset>(), Err(TriageError::UnknownPreset(_))));
    }

    #[test]
    fn override_applies_on_preset() {
        let cfg: ParamsOverride =
            serde_json::from_str(r#"{"preset": "lenient", "max_resources": 4}"#).unwrap();
        let params = cfg.into_params();
        assert_eq!(params.max_resources, 4);
        assert_eq!(params.thresholds, Params::lenient().thresholds);
        assert_eq!(params.resource_weight, 0.25);
    }
}
