//! Descriptive statistics over scores and levels.
//!
//! ```text
//! mean    μ  = Σ x / n
//! var     σ² = Σ (x − μ)² / (n − 1)
//! se         = σ / √n
//! ci95       = μ ± 1.96·se
//! ```
//!
//! Single-slice functions return 0 when there is too little data.

use serde::{Deserialize, Serialize};
use triage_core::{Level, LevelCounts};

use crate::{check_paired, ratio, MetricsError};

const Z_95: f64 = 1.96;

pub fn sum(x: &[f64]) -> f64 {
    x.iter().sum()
}

pub fn mean(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    sum(x) / x.len() as f64
}

/// Sample variance (divisor `n − 1`); 0 when `n < 2`.
pub fn variance(x: &[f64]) -> f64 {
    if x.len() < 2 {
        return 0.0;
    }
    let mu = mean(x);
    x.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / (x.len() - 1) as f64
}

pub fn std_dev(x: &[f64]) -> f64 {
    variance(x).sqrt()
}

pub fn standard_error(x: &[f64]) -> f64 {
    if x.len() < 2 {
        return 0.0;
    }
    std_dev(x) / (x.len() as f64).sqrt()
}

/// Normal-approximation 95% interval for the mean; `(0, 0)` when `n < 2`.
pub fn ci95(x: &[f64]) -> (f64, f64) {
    if x.len() < 2 {
        return (0.0, 0.0);
    }
    let mu = mean(x);
    let se = standard_error(x);
    (mu - Z_95 * se, mu + Z_95 * se)
}

fn sorted(x: &[f64]) -> Vec<f64> {
    let mut copy = x.to_vec();
    copy.sort_by(f64::total_cmp);
    copy
}

pub fn median(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let s = sorted(x);
    let n = s.len();
    if n % 2 == 1 {
        s[n / 2]
    } else {
        (s[n / 2 - 1] + s[n / 2]) / 2.0
    }
}

/// `p`-th percentile, `p` in `[0, 100]`, interpolating linearly between
/// order statistics. 0 for empty input or `p` out of range.
pub fn percentile(x: &[f64], p: f64) -> f64 {
    if x.is_empty() || !(0.0..=100.0).contains(&p) {
        return 0.0;
    }
    let s = sorted(x);
    let position = p / 100.0 * (s.len() - 1) as f64;
    let lower = position.floor() as usize;
    if lower >= s.len() - 1 {
        return s[s.len() - 1];
    }
    let fraction = position - lower as f64;
    s[lower] * (1.0 - fraction) + s[lower + 1] * fraction
}

pub fn min(x: &[f64]) -> f64 {
    x.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

pub fn max(x: &[f64]) -> f64 {
    x.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

/// Summary of a set of acuity scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreStats {
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub se: f64,
    pub ci95_low: f64,
    pub ci95_high: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

impl ScoreStats {
    pub fn compute(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }
        let (ci95_low, ci95_high) = ci95(scores);
        Self {
            n: scores.len(),
            mean: mean(scores),
            std_dev: std_dev(scores),
            se: standard_error(scores),
            ci95_low,
            ci95_high,
            min: min(scores),
            max: max(scores),
            p25: percentile(scores, 25.0),
            p50: percentile(scores, 50.0),
            p75: percentile(scores, 75.0),
        }
    }
}

/// Level distribution with proportions in [`Level::ALL`] order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelStats {
    pub counts: LevelCounts,
    pub total: usize,
    pub proportions: [f64; 5],
}

impl LevelStats {
    pub fn compute(levels: &[Level]) -> Self {
        let counts = LevelCounts::from_levels(levels.iter().copied());
        Self {
            counts,
            total: counts.total(),
            proportions: counts.proportions(),
        }
    }
}

/// Pearson correlation; 0 when `n < 2` or either side is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64, MetricsError> {
    check_paired(x, y)?;
    if x.len() < 2 {
        return Ok(0.0);
    }
    let (mx, my) = (mean(x), mean(y));
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return Ok(0.0);
    }
    Ok(sxy / (sxx.sqrt() * syy.sqrt()))
}

pub fn rmse(predicted: &[f64], reference: &[f64]) -> Result<f64, MetricsError> {
    check_paired(predicted, reference)?;
    if predicted.is_empty() {
        return Ok(0.0);
    }
    let squared: f64 = predicted
        .iter()
        .zip(reference)
        .map(|(p, r)| (p - r).powi(2))
        .sum();
    Ok((squared / predicted.len() as f64).sqrt())
}

pub fn mae(predicted: &[f64], reference: &[f64]) -> Result<f64, MetricsError> {
    check_paired(predicted, reference)?;
    if predicted.is_empty() {
        return Ok(0.0);
    }
    let absolute: f64 = predicted.iter().zip(reference).map(|(p, r)| (p - r).abs()).sum();
    Ok(absolute / predicted.len() as f64)
}

/// Share of pairs with `|predicted − reference| <= tolerance`.
pub fn within_tolerance(
    predicted: &[f64],
    reference: &[f64],
    tolerance: f64,
) -> Result<f64, MetricsError> {
    check_paired(predicted, reference)?;
    let hits = predicted
        .iter()
        .zip(reference)
        .filter(|(p, r)| (**p - **r).abs() <= tolerance)
        .count();
    Ok(ratio(hits, predicted.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn moments() {
        let x = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&x), 5.0);
        assert!((variance(&x) - 32.0 / 7.0).abs() < EPS);
        assert!((standard_error(&x) - (32.0_f64 / 7.0).sqrt() / 8.0_f64.sqrt()).abs() < EPS);
        let (low, high) = ci95(&x);
        assert!(low < 5.0 && high > 5.0);
        assert!(((low + high) / 2.0 - 5.0).abs() < EPS);
    }

    #[test]
    fn small_samples_fall_back_to_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(variance(&[3.0]), 0.0);
        assert_eq!(standard_error(&[3.0]), 0.0);
        assert_eq!(ci95(&[3.0]), (0.0, 0.0));
        assert_eq!(median(&[]), 0.0);
        assert_eq!(min(&[]), 0.0);
        assert_eq!(max(&[]), 0.0);
        assert_eq!(ScoreStats::compute(&[]), ScoreStats::default());
    }

    #[test]
    fn order_statistics() {
        let x = [0.9, 0.1, 0.5, 0.3];
        assert!((median(&x) - 0.4).abs() < EPS);
        assert_eq!(median(&[0.9, 0.1, 0.5]), 0.5);
        assert_eq!(percentile(&x, 0.0), 0.1);
        assert_eq!(percentile(&x, 100.0), 0.9);
        assert!((percentile(&[1.0, 2.0, 3.0, 4.0, 5.0], 25.0) - 2.0).abs() < EPS);
        assert!((percentile(&[10.0, 20.0], 25.0) - 12.5).abs() < EPS);
        assert_eq!(percentile(&x, 101.0), 0.0);
        assert_eq!(min(&x), 0.1);
        assert_eq!(max(&x), 0.9);
    }

    #[test]
    fn score_and_level_summaries() {
        let stats = ScoreStats::compute(&[0.2, 0.4, 0.6, 0.8]);
        assert_eq!(stats.n, 4);
        assert!((stats.mean - 0.5).abs() < EPS);
        assert!((stats.p50 - 0.5).abs() < EPS);
        assert_eq!(stats.min, 0.2);

        let levels = LevelStats::compute(&[Level::Urgent, Level::Urgent, Level::Emergent, Level::NonUrgent]);
        assert_eq!(levels.total, 4);
        assert_eq!(levels.counts.get(Level::Urgent), 2);
        assert_eq!(levels.proportions, [0.0, 0.25, 0.5, 0.0, 0.25]);
    }

    #[test]
    fn paired_measures() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < EPS);
        assert_eq!(pearson(&x, &[1.0; 4]).unwrap(), 0.0);
        assert!((rmse(&x, &y).unwrap() - 7.5_f64.sqrt()).abs() < EPS);
        assert_eq!(mae(&x, &y).unwrap(), 2.5);
        assert_eq!(within_tolerance(&x, &y, 2.0).unwrap(), 0.5);
        assert!(rmse(&x, &y[..2]).is_err());
        assert!(matches!(
            mae(&[1.0], &[]),
            Err(MetricsError::LengthMismatch { left: 1, right: 0 })
        ));
    }
}
