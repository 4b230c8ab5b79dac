//! Reference ranges (normal values) for the seven vital signs.
//!
//! Each range is a `(mid, half_width)` pair. A value `half_width` away from
//! `mid` has deviation 1; anything further is capped at 1.
//!
//! | Vital | Adult mid ± hw | Pediatric mid ± hw |
//! |-------|----------------|--------------------|
//! | HR    | 80 ± 40        | 100 ± 50           |
//! | RR    | 16 ± 10        | 24 ± 14            |
//! | SBP   | 120 ± 40       | 90 ± 30            |
//! | DBP   | 80 ± 30        | 60 ± 25            |
//! | Temp  | 37.0 ± 2.0     | 37.0 ± 2.0         |
//! | SpO2  | 98 ± 8         | 98 ± 8             |
//! | GCS   | 15 ± 6         | 15 ± 6             |
//!
//! The pediatric table is illustrative; calibrate against local protocol.

use serde::{Deserialize, Serialize};

use crate::params::VitalWeights;
use crate::vitals::{deviation, VitalSign};

/// Normal range for one vital sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub mid: f64,
    pub half_width: f64,
}

impl ReferenceRange {
    pub const fn new(mid: f64, half_width: f64) -> Self {
        Self { mid, half_width }
    }

    pub fn deviation(&self, value: f64) -> f64 {
        deviation(value, self.mid, self.half_width)
    }

    /// A range with a non-positive half width takes its vital out of scoring.
    pub fn is_active(&self) -> bool {
        self.half_width > 0.0
    }
}

const ADULT: ReferenceRanges = ReferenceRanges {
    hr: ReferenceRange::new(80.0, 40.0),
    rr: ReferenceRange::new(16.0, 10.0),
    sbp: ReferenceRange::new(120.0, 40.0),
    dbp: ReferenceRange::new(80.0, 30.0),
    temp: ReferenceRange::new(37.0, 2.0),
    spo2: ReferenceRange::new(98.0, 8.0),
    gcs: ReferenceRange::new(15.0, 6.0),
};

const PEDIATRIC: ReferenceRanges = ReferenceRanges {
    hr: ReferenceRange::new(100.0, 50.0),
    rr: ReferenceRange::new(24.0, 14.0),
    sbp: ReferenceRange::new(90.0, 30.0),
    dbp: ReferenceRange::new(60.0, 25.0),
    temp: ReferenceRange::new(37.0, 2.0),
    spo2: ReferenceRange::new(98.0, 8.0),
    gcs: ReferenceRange::new(15.0, 6.0),
};

/// Reference ranges for a population, one field per vital.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRanges {
    pub hr: ReferenceRange,
    pub rr: ReferenceRange,
    pub sbp: ReferenceRange,
    pub dbp: ReferenceRange,
    pub temp: ReferenceRange,
    pub spo2: ReferenceRange,
    pub gcs: ReferenceRange,
}

impl Default for ReferenceRanges {
    fn default() -> Self {
        ADULT
    }
}

impl ReferenceRanges {
    /// Standard adult ED ranges; every half width is positive.
    pub const fn adult() -> Self {
        ADULT
    }

    pub const fn pediatric() -> Self {
        PEDIATRIC
    }

    pub fn get(&self, sign: VitalSign) -> ReferenceRange {
        match sign {
            VitalSign::HeartRate => self.hr,
            VitalSign::RespiratoryRate => self.rr,
            VitalSign::Systolic => self.sbp,
            VitalSign::Diastolic => self.dbp,
            VitalSign::Temperature => self.temp,
            VitalSign::OxygenSaturation => self.spo2,
            VitalSign::Gcs => self.gcs,
        }
    }

    pub fn set(&mut self, sign: VitalSign, range: ReferenceRange) {
        let slot = match sign {
            VitalSign::HeartRate => &mut self.hr,
            VitalSign::RespiratoryRate => &mut self.rr,
            VitalSign::Systolic => &mut self.sbp,
            VitalSign::Diastolic => &mut self.dbp,
            VitalSign::Temperature => &mut self.temp,
            VitalSign::OxygenSaturation => &mut self.spo2,
            VitalSign::Gcs => &mut self.gcs,
        };
        *slot = range;
    }

    /// Builder form of [`ReferenceRanges::set`].
    pub fn with(mut self, sign: VitalSign, range: ReferenceRange) -> Self {
        self.set(sign, range);
        self
    }

    /// All values finite and no half width negative.
    pub fn is_valid(&self) -> bool {
        VitalSign::ALL.iter().all(|sign| {
            let range = self.get(*sign);
            range.mid.is_finite() && range.half_width.is_finite() && range.half_width >= 0.0
        })
    }

    /// Overwrite the entries for which `other` has a positive half width.
    pub fn merge_with(&mut self, other: &ReferenceRanges) {
        for sign in VitalSign::ALL {
            let candidate = other.get(sign);
            if candidate.is_active() {
                self.set(sign, candidate);
            }
        }
    }

    /// Widen or narrow every band without moving midpoints. No-op if `factor <= 0`.
    pub fn scale_half_widths(&mut self, factor: f64) {
        if factor <= 0.0 {
            return;
        }
        for sign in VitalSign::ALL {
            let mut range = self.get(sign);
            range.half_width *= factor;
            self.set(sign, range);
        }
    }

    /// `(Σ w·d, Σ w)` over vitals that are present and have an active range.
    /// `values` are in [`VitalSign::ALL`] order. A zero weight adds nothing
    /// to either sum.
    pub fn weighted_deviation_sum(
        &self,
        values: &[f64; VitalSign::COUNT],
        weights: &VitalWeights,
    ) -> (f64, f64) {
        let mut sum = 0.0;
        let mut weight_sum = 0.0;
        for sign in VitalSign::ALL {
            let value = values[sign.index()];
            let range = self.get(sign);
            if !sign.is_present_value(value) || !range.is_active() {
                continue;
            }
            let weight = weights[sign];
            sum += weight * range.deviation(value);
            weight_sum += weight;
        }
        (sum, weight_sum)
    }
}
