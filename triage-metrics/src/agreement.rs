//! Ordinal agreement between two level assignments.

use triage_core::Level;

use crate::{check_paired, ratio, MetricsError};

/// Linear agreement weight: 1 for equal levels, 0 for levels 1 and 5.
fn linear_weight(a: Level, b: Level) -> f64 {
    1.0 - f64::from(a.distance(b)) / 4.0
}

/// Linearly weighted kappa. Near misses count as partial agreement, so
/// this is the usual choice for ordinal scales like triage levels.
///
/// Returns 0 for empty input or when expected agreement is total.
pub fn weighted_kappa(predicted: &[Level], reference: &[Level]) -> Result<f64, MetricsError> {
    check_paired(predicted, reference)?;
    if predicted.is_empty() {
        return Ok(0.0);
    }
    let n = predicted.len() as f64;
    let observed = predicted
        .iter()
        .zip(reference)
        .map(|(p, r)| linear_weight(*p, *r))
        .sum::<f64>()
        / n;

    let mut pred_counts = [0usize; 5];
    let mut ref_counts = [0usize; 5];
    for (p, r) in predicted.iter().zip(reference) {
        pred_counts[usize::from(p.as_u8() - 1)] += 1;
        ref_counts[usize::from(r.as_u8() - 1)] += 1;
    }
    let mut expected = 0.0;
    for (i, a) in Level::ALL.iter().enumerate() {
        for (j, b) in Level::ALL.iter().enumerate() {
            expected += (pred_counts[i] as f64 / n) * (ref_counts[j] as f64 / n) * linear_weight(*a, *b);
        }
    }
    if expected >= 1.0 {
        return Ok(0.0);
    }
    Ok((observed - expected) / (1.0 - expected))
}

/// Share of pairs with identical levels.
pub fn exact_agreement(predicted: &[Level], reference: &[Level]) -> Result<f64, MetricsError> {
    check_paired(predicted, reference)?;
    let hits = predicted.iter().zip(reference).filter(|(p, r)| p == r).count();
    Ok(ratio(hits, predicted.len()))
}

/// Share of pairs at most one level apart.
pub fn within_one_level(predicted: &[Level], reference: &[Level]) -> Result<f64, MetricsError> {
    check_paired(predicted, reference)?;
    let hits = predicted
        .iter()
        .zip(reference)
        .filter(|(p, r)| p.distance(**r) <= 1)
        .count();
    Ok(ratio(hits, predicted.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use Level::*;

    #[test]
    fn perfect_agreement() {
        let levels = [Resuscitation, Emergent, Urgent, LessUrgent, NonUrgent];
        assert!((weighted_kappa(&levels, &levels).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(exact_agreement(&levels, &levels).unwrap(), 1.0);
        assert_eq!(within_one_level(&levels, &levels).unwrap(), 1.0);
    }

    #[test]
    fn near_misses_score_better_than_far_misses() {
        let reference = [Resuscitation, Emergent, Urgent, LessUrgent, NonUrgent];
        let near = [Emergent, Resuscitation, LessUrgent, Urgent, NonUrgent];
        let far = [NonUrgent, LessUrgent, Urgent, Emergent, Resuscitation];
        let near_kappa = weighted_kappa(&near, &reference).unwrap();
        let far_kappa = weighted_kappa(&far, &reference).unwrap();
        assert!(near_kappa > far_kappa);
        assert!(far_kappa < 0.0);
        assert_eq!(within_one_level(&near, &reference).unwrap(), 1.0);
        assert_eq!(exact_agreement(&near, &reference).unwrap(), 0.2);
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(weighted_kappa(&[], &[]).unwrap(), 0.0);
        assert_eq!(exact_agreement(&[], &[]).unwrap(), 0.0);
        let same = [Urgent; 3];
        assert_eq!(weighted_kappa(&same, &same).unwrap(), 0.0);
        assert!(within_one_level(&[Urgent], &[Urgent, Urgent]).is_err());
    }
}
