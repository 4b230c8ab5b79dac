use serde::{Deserialize, Serialize};
use triage_core::Level;

use crate::{check_paired, ratio, MetricsError};

fn idx(level: Level) -> usize {
    usize::from(level.as_u8() - 1)
}

/// 5×5 confusion matrix; rows are the reference level, columns the predicted one.
///
/// Built only from paired levels, so `total` always equals the cell sum.
/// A deserialized matrix may break that; one-vs-rest counts then saturate
/// at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: [[usize; 5]; 5],
    total: usize,
}

impl ConfusionMatrix {
    pub fn from_levels(predicted: &[Level], reference: &[Level]) -> Result<Self, MetricsError> {
        check_paired(predicted, reference)?;
        let mut cm = Self::default();
        for (p, r) in predicted.iter().zip(reference) {
            cm.counts[idx(*r)][idx(*p)] += 1;
            cm.total += 1;
        }
        Ok(cm)
    }

    /// Cells indexed `[reference - 1][predicted - 1]`.
    pub fn counts(&self) -> &[[usize; 5]; 5] {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn get(&self, reference: Level, predicted: Level) -> usize {
        self.counts[idx(reference)][idx(predicted)]
    }

    pub fn tp(&self, level: Level) -> usize {
        self.get(level, level)
    }

    /// Predicted `level`, reference some other level.
    pub fn fp(&self, level: Level) -> usize {
        let col = idx(level);
        (0..5).filter(|r| *r != col).map(|r| self.counts[r][col]).sum()
    }

    /// Reference `level`, predicted some other level.
    pub fn fn_(&self, level: Level) -> usize {
        let row = idx(level);
        (0..5).filter(|c| *c != row).map(|c| self.counts[row][c]).sum()
    }

    pub fn tn(&self, level: Level) -> usize {
        self.total
            .saturating_sub(self.tp(level))
            .saturating_sub(self.fp(level))
            .saturating_sub(self.fn_(level))
    }

    pub fn sensitivity(&self, level: Level) -> f64 {
        ratio(self.tp(level), self.tp(level) + self.fn_(level))
    }

    pub fn specificity(&self, level: Level) -> f64 {
        ratio(self.tn(level), self.tn(level) + self.fp(level))
    }

    pub fn ppv(&self, level: Level) -> f64 {
        ratio(self.tp(level), self.tp(level) + self.fp(level))
    }

    pub fn npv(&self, level: Level) -> f64 {
        ratio(self.tn(level), self.tn(level) + self.fn_(level))
    }

    pub fn f1(&self, level: Level) -> f64 {
        f1(self.ppv(level), self.sensitivity(level))
    }

    /// One-vs-rest accuracy for `level`.
    pub fn accuracy(&self, level: Level) -> f64 {
        ratio(self.tp(level) + self.tn(level), self.total)
    }

    pub fn macro_sensitivity(&self) -> f64 {
        self.macro_mean(Self::sensitivity)
    }

    pub fn macro_specificity(&self) -> f64 {
        self.macro_mean(Self::specificity)
    }

    pub fn macro_f1(&self) -> f64 {
        self.macro_mean(Self::f1)
    }

    fn macro_mean(&self, metric: fn(&Self, Level) -> f64) -> f64 {
        Level::ALL.iter().map(|level| metric(self, *level)).sum::<f64>() / 5.0
    }

    /// Share of the diagonal.
    pub fn overall_accuracy(&self) -> f64 {
        let diagonal = (0..5).map(|i| self.counts[i][i]).sum();
        ratio(diagonal, self.total)
    }

    /// Cohen's kappa; 0 when empty or when chance agreement is total.
    pub fn cohen_kappa(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let n = self.total as f64;
        let observed = self.overall_accuracy();
        let expected: f64 = (0..5)
            .map(|i| {
                let row: usize = self.counts[i].iter().sum();
                let col: usize = (0..5).map(|r| self.counts[r][i]).sum();
                row as f64 * col as f64 / (n * n)
            })
            .sum();
        if expected >= 1.0 {
            return 0.0;
        }
        (observed - expected) / (1.0 - expected)
    }
}

fn f1(ppv: f64, sensitivity: f64) -> f64 {
    if ppv + sensitivity == 0.0 {
        return 0.0;
    }
    2.0 * ppv * sensitivity / (ppv + sensitivity)
}

/// 2×2 matrix where the levels in `positive` form the positive class,
/// e.g. `[Resuscitation, Emergent]` for "high acuity".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryConfusion {
    pub tp: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tn: usize,
}

impl BinaryConfusion {
    pub fn from_levels(
        predicted: &[Level],
        reference: &[Level],
        positive: &[Level],
    ) -> Result<Self, MetricsError> {
        check_paired(predicted, reference)?;
        let mut b = Self::default();
        for (p, r) in predicted.iter().zip(reference) {
            match (positive.contains(r), positive.contains(p)) {
                (true, true) => b.tp += 1,
                (false, true) => b.fp += 1,
                (true, false) => b.fn_ += 1,
                (false, false) => b.tn += 1,
            }
        }
        Ok(b)
    }

    /// Levels 1 and 2 positive.
    pub fn high_acuity(predicted: &[Level], reference: &[Level]) -> Result<Self, MetricsError> {
        Self::from_levels(predicted, reference, &[Level::Resuscitation, Level::Emergent])
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.fn_ + self.tn
    }

    pub fn sensitivity(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn specificity(&self) -> f64 {
        ratio(self.tn, self.tn + self.fp)
    }

    pub fn ppv(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn npv(&self) -> f64 {
        ratio(self.tn, self.tn + self.fn_)
    }

    pub fn f1(&self) -> f64 {
        f1(self.ppv(), self.sensitivity())
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }
}
