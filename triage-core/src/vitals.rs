//! Vital sign record and the deviation primitive.

use serde::{Deserialize, Serialize};

/// One set of vital signs taken at triage.
///
/// Units: HR (bpm), RR (/min), SBP/DBP (mmHg), Temp (°C), SpO2 (%), GCS (3-15).
/// A field equal to zero means "not measured" and is left out of scoring.
/// Integer fields count as present only when strictly positive, temperature
/// whenever it differs from `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    #[serde(default)]
    pub hr: i32,
    #[serde(default)]
    pub rr: i32,
    #[serde(default)]
    pub sbp: i32,
    #[serde(default)]
    pub dbp: i32,
    #[serde(default)]
    pub temp: f64,
    #[serde(default)]
    pub spo2: i32,
    #[serde(default)]
    pub gcs: i32,
}

/// The seven scored measurements, in the fixed order used by weight vectors
/// and reference ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalSign {
    HeartRate,
    RespiratoryRate,
    Systolic,
    Diastolic,
    Temperature,
    OxygenSaturation,
    Gcs,
}

impl VitalSign {
    pub const COUNT: usize = 7;

    pub const ALL: [VitalSign; Self::COUNT] = [
        VitalSign::HeartRate,
        VitalSign::RespiratoryRate,
        VitalSign::Systolic,
        VitalSign::Diastolic,
        VitalSign::Temperature,
        VitalSign::OxygenSaturation,
        VitalSign::Gcs,
    ];

    /// Position in weight vectors and range tables.
    pub fn index(self) -> usize {
        match self {
            VitalSign::HeartRate => 0,
            VitalSign::RespiratoryRate => 1,
            VitalSign::Systolic => 2,
            VitalSign::Diastolic => 3,
            VitalSign::Temperature => 4,
            VitalSign::OxygenSaturation => 5,
            VitalSign::Gcs => 6,
        }
    }

    /// Short field name, matching the serialized `Vitals` keys.
    pub fn code(self) -> &'static str {
        match self {
            VitalSign::HeartRate => "hr",
            VitalSign::RespiratoryRate => "rr",
            VitalSign::Systolic => "sbp",
            VitalSign::Diastolic => "dbp",
            VitalSign::Temperature => "temp",
            VitalSign::OxygenSaturation => "spo2",
            VitalSign::Gcs => "gcs",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            VitalSign::HeartRate => "bpm",
            VitalSign::RespiratoryRate => "/min",
            VitalSign::Systolic | VitalSign::Diastolic => "mmHg",
            VitalSign::Temperature => "°C",
            VitalSign::OxygenSaturation => "%",
            VitalSign::Gcs => "3-15",
        }
    }

    /// Presence rule for one raw value of this sign: temperature counts
    /// whenever it differs from `0.0`, every other sign only when positive.
    pub fn is_present_value(self, value: f64) -> bool {
        match self {
            VitalSign::Temperature => value != 0.0,
            _ => value > 0.0,
        }
    }
}

impl Vitals {
    /// Raw value of one measurement as `f64`.
    pub fn value(&self, sign: VitalSign) -> f64 {
        match sign {
            VitalSign::HeartRate => f64::from(self.hr),
            VitalSign::RespiratoryRate => f64::from(self.rr),
            VitalSign::Systolic => f64::from(self.sbp),
            VitalSign::Diastolic => f64::from(self.dbp),
            VitalSign::Temperature => self.temp,
            VitalSign::OxygenSaturation => f64::from(self.spo2),
            VitalSign::Gcs => f64::from(self.gcs),
        }
    }

    /// Whether the measurement was taken.
    ///
    /// Temperature uses `!= 0.0`, the integer fields use `> 0`, so a negative
    /// temperature counts as present while a negative heart rate does not.
    pub fn is_present(&self, sign: VitalSign) -> bool {
        sign.is_present_value(self.value(sign))
    }

    pub fn present_count(&self) -> usize {
        VitalSign::ALL
            .iter()
            .filter(|sign| self.is_present(**sign))
            .count()
    }

    pub fn has_any(&self) -> bool {
        VitalSign::ALL.iter().any(|sign| self.is_present(*sign))
    }

    /// Values in [`VitalSign::ALL`] order.
    pub fn to_values(&self) -> [f64; VitalSign::COUNT] {
        VitalSign::ALL.map(|sign| self.value(sign))
    }
}

/// Normalised distance of `value` from `mid`: `min(1, |value - mid| / half_width)`.
///
/// Returns 0 when `half_width <= 0` or the result is NaN. Zero is not treated
/// as missing here; presence is decided by the caller.
pub fn deviation(value: f64, mid: f64, half_width: f64) -> f64 {
    if half_width <= 0.0 {
        return 0.0;
    }
    let d = (value - mid).abs() / half_width;
    if d.is_nan() {
        0.0
    } else if d > 1.0 {
        1.0
    } else {
        d
    }
}
