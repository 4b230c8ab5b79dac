//! Agreement and accuracy metrics for predicted versus reference triage levels.
//!
//! | Metric        | Formula                        |
//! |---------------|--------------------------------|
//! | Sensitivity   | TP / (TP + FN)                 |
//! | Specificity   | TN / (TN + FP)                 |
//! | PPV           | TP / (TP + FP)                 |
//! | NPV           | TN / (TN + FN)                 |
//! | F1            | 2·PPV·Sens / (PPV + Sens)      |
//! | Cohen's kappa | (p_o − p_e) / (1 − p_e)        |
//!
//! Ratios with a zero denominator are 0. Every function taking two paired
//! slices fails with [`MetricsError::LengthMismatch`] when their lengths
//! differ.

use thiserror::Error;

pub mod agreement;
pub mod confusion;
pub mod roc;
pub mod stats;

pub use agreement::{exact_agreement, weighted_kappa, within_one_level};
pub use confusion::{BinaryConfusion, ConfusionMatrix};
pub use roc::{auc, calibration_error};
pub use stats::{LevelStats, ScoreStats};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("paired inputs differ in length: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

pub(crate) fn check_paired<A, B>(left: &[A], right: &[B]) -> Result<(), MetricsError> {
    if left.len() != right.len() {
        return Err(MetricsError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    Ok(())
}

/// `num / den`, or 0 when `den` is 0.
pub(crate) fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
