//! Discrimination and calibration of continuous scores against a binary outcome.

use crate::{check_paired, MetricsError};

/// Area under the ROC curve, computed as the Mann-Whitney statistic: the
/// probability that a random positive case scores above a random negative
/// one. Tied scores count ½.
///
/// Returns 0.5 when either class is absent (including empty input).
pub fn auc(scores: &[f64], outcomes: &[bool]) -> Result<f64, MetricsError> {
    check_paired(scores, outcomes)?;
    let mut pairs: Vec<(f64, bool)> = scores.iter().copied().zip(outcomes.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let positives = pairs.iter().filter(|(_, o)| *o).count();
    let negatives = pairs.len() - positives;
    if positives == 0 || negatives == 0 {
        return Ok(0.5);
    }

    // Sum of 1-based ranks of the positives, ties sharing their average rank.
    let mut rank_sum = 0.0;
    let mut start = 0;
    while start < pairs.len() {
        let mut end = start + 1;
        while end < pairs.len() && pairs[end].0 == pairs[start].0 {
            end += 1;
        }
        let average_rank = (start + end + 1) as f64 / 2.0;
        let tied_positives = pairs[start..end].iter().filter(|(_, o)| *o).count();
        rank_sum += average_rank * tied_positives as f64;
        start = end;
    }

    let p = positives as f64;
    let u = rank_sum - p * (p + 1.0) / 2.0;
    Ok(u / (p * negatives as f64))
}

/// Mean absolute gap between each score (clamped to `[0, 1]`) and its
/// outcome as 0 or 1. 0 for empty input.
pub fn calibration_error(scores: &[f64], outcomes: &[bool]) -> Result<f64, MetricsError> {
    check_paired(scores, outcomes)?;
    if scores.is_empty() {
        return Ok(0.0);
    }
    let total: f64 = scores
        .iter()
        .zip(outcomes)
        .map(|(s, o)| (s.clamp(0.0, 1.0) - if *o { 1.0 } else { 0.0 }).abs())
        .sum();
    Ok(total / scores.len() as f64)
}
