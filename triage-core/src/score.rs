//! The acuity formula.
//!
//! ```text
//! V   = Σ w_i·d_i / Σ w_i      over present vitals with an active range
//! R   = resource_weight · min(1, count / max_resources)
//! s   = clamp((V + R) / (Σ all w_i + resource_weight), 0, 1)
//! ```
//!
//! `V` is averaged over the weights of the vitals actually observed, so
//! missing measurements do not pull it towards normal. The final divisor is
//! fixed by the parameter set (all seven weights plus the resource weight),
//! which caps a vitals-only score at `Σ w_i / divisor` (0.8 with defaults).

use serde::{Deserialize, Serialize};

use crate::params::{Params, VitalWeights};
use crate::ranges::ReferenceRanges;
use crate::vitals::Vitals;

/// Weighted mean deviation of the present vitals, in `[0, 1]`.
///
/// Returns 0 when no present vital carries positive weight, or when the
/// quotient is NaN.
pub fn vital_component(vitals: &Vitals, weights: &VitalWeights, ranges: &ReferenceRanges) -> f64 {
    let (sum, weight_sum) = ranges.weighted_deviation_sum(&vitals.to_values(), weights);
    if weight_sum <= 0.0 {
        return 0.0;
    }
    let v = sum / weight_sum;
    if v.is_nan() {
        return 0.0;
    }
    v.min(1.0)
}

/// Saturating resource term. Zero if any of the inputs is non-positive.
pub fn resource_component(resource_count: i32, max_resources: i32, weight: f64) -> f64 {
    if max_resources <= 0 || weight <= 0.0 || resource_count <= 0 {
        return 0.0;
    }
    let ratio = (f64::from(resource_count) / f64::from(max_resources)).min(1.0);
    weight * ratio
}

/// `raw / divisor` clamped to `[0, 1]`; 0 when the divisor is not positive.
pub fn normalize(raw: f64, divisor: f64) -> f64 {
    if divisor <= 0.0 {
        return 0.0;
    }
    let score = raw / divisor;
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}

/// Normalised acuity score in `[0, 1]`.
pub fn acuity(
    vitals: &Vitals,
    resource_count: i32,
    params: &Params,
    ranges: &ReferenceRanges,
) -> f64 {
    ScoreBreakdown::compute(vitals, resource_count, params, ranges).score
}

/// Every intermediate term of one score, for audit trails.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Vital component `V`.
    pub vital: f64,
    /// Resource component `R`.
    pub resource: f64,
    /// `V + R`.
    pub raw: f64,
    pub divisor: f64,
    pub score: f64,
}

impl ScoreBreakdown {
    pub fn compute(
        vitals: &Vitals,
        resource_count: i32,
        params: &Params,
        ranges: &ReferenceRanges,
    ) -> Self {
        let vital = vital_component(vitals, &params.vital_weights, ranges);
        let resource =
            resource_component(resource_count, params.max_resources, params.resource_weight);
        let raw = vital + resource;
        let divisor = params.divisor();
        Self {
            vital,
            resource,
            raw,
            divisor,
            score: normalize(raw, divisor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranges::ReferenceRange;
    use crate::vitals::VitalSign;

    const EPS: f64 = 1e-9;

    fn midpoint_vitals() -> Vitals {
        Vitals {
            hr: 80,
            rr: 16,
            sbp: 120,
            dbp: 80,
            temp: 37.0,
            spo2: 98,
            gcs: 15,
        }
    }

    #[test]
    fn midpoints_give_zero_vital_component() {
        let v = vital_component(
            &midpoint_vitals(),
            &VitalWeights::default(),
            &ReferenceRanges::adult(),
        );
        assert_eq!(v, 0.0);
    }

    #[test]
    fn vital_component_averages_over_present_weights() {
        // HR maximally deviant, nothing else measured: V = 1.
        let vitals = Vitals {
            hr: 200,
            ..Vitals::default()
        };
        let params = Params::default();
        let ranges = ReferenceRanges::adult();
        assert_eq!(vital_component(&vitals, &params.vital_weights, &ranges), 1.0);
        // The final score divides by the full divisor: V / 1.25.
        let breakdown = ScoreBreakdown::compute(&vitals, 0, &params, &ranges);
        assert!((breakdown.score - 1.0 / 1.25).abs() < EPS);
    }

    #[test]
    fn inactive_range_drops_vital() {
        let vitals = Vitals {
            hr: 200,
            rr: 16,
            ..Vitals::default()
        };
        let ranges = ReferenceRanges::adult().with(VitalSign::HeartRate, ReferenceRange::new(80.0, 0.0));
        assert_eq!(vital_component(&vitals, &VitalWeights::default(), &ranges), 0.0);
    }

    #[test]
    fn nan_range_does_not_max_out_vital() {
        let vitals = Vitals {
            hr: 80,
            ..Vitals::default()
        };
        let ranges = ReferenceRanges::adult().with(VitalSign::HeartRate, ReferenceRange::new(f64::NAN, 40.0));
        assert_eq!(vital_component(&vitals, &VitalWeights::default(), &ranges), 0.0);
        let score = acuity(&vitals, 0, &Params::default(), &ranges);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn nan_weight_gives_zero() {
        let vitals = Vitals {
            hr: 200,
            ..Vitals::default()
        };
        let mut weights = VitalWeights::default();
        weights[VitalSign::HeartRate] = f64::NAN;
        assert_eq!(vital_component(&vitals, &weights, &ReferenceRanges::adult()), 0.0);
    }

    #[test]
    fn acuity_is_breakdown_score() {
        let vitals = Vitals {
            hr: 130,
            spo2: 90,
            ..Vitals::default()
        };
        let (params, ranges) = (Params::strict(), ReferenceRanges::pediatric());
        let breakdown = ScoreBreakdown::compute(&vitals, 2, &params, &ranges);
        assert_eq!(acuity(&vitals, 2, &params, &ranges), breakdown.score);
    }

    #[test]
    fn zero_weights_give_zero() {
        let vitals = Vitals {
            hr: 200,
            ..Vitals::default()
        };
        let weights = VitalWeights([0.0; VitalSign::COUNT]);
        assert_eq!(vital_component(&vitals, &weights, &ReferenceRanges::adult()), 0.0);
    }

    #[test]
    fn resource_component_saturates() {
        assert_eq!(resource_component(3, 6, 0.25), 0.125);
        assert_eq!(resource_component(6, 6, 0.25), 0.25);
        assert_eq!(resource_component(100, 6, 0.25), 0.25);
        assert_eq!(resource_component(-3, 6, 0.25), 0.0);
        assert_eq!(resource_component(3, 0, 0.25), 0.0);
        assert_eq!(resource_component(3, 6, 0.0), 0.0);
    }

    #[test]
    fn normalize_guards_divisor_and_clamps() {
        assert_eq!(normalize(0.5, 0.0), 0.0);
        assert_eq!(normalize(0.5, -1.0), 0.0);
        assert_eq!(normalize(3.0, 1.0), 1.0);
        assert_eq!(normalize(-3.0, 1.0), 0.0);
        assert_eq!(normalize(f64::NAN, 1.0), 0.0);
    }

    #[test]
    fn breakdown_terms_add_up() {
        let vitals = Vitals {
            hr: 120,
            rr: 24,
            sbp: 90,
            dbp: 60,
            spo2: 92,
            ..Vitals::default()
        };
        let b = ScoreBreakdown::compute(&vitals, 3, &Params::default(), &ReferenceRanges::adult());
        assert!((b.raw - (b.vital + b.resource)).abs() < EPS);
        assert!((b.resource - 0.125).abs() < EPS);
        assert!((b.divisor - 1.25).abs() < EPS);
        // (0.18 + 0.176 + 0.12 + 0.0667 + 0.12) / 0.82 + 0.125, over 1.25.
        assert!((b.score - 0.7466).abs() < 1e-3);
    }
}
