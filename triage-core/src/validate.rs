//! Input hygiene for vitals, resource counts and parameter sets.
//!
//! | Input     | Rule (0 = missing is always allowed) |
//! |-----------|--------------------------------------|
//! | HR        | 20..=300                             |
//! | RR        | 0..=60                               |
//! | SBP       | 40..=300                             |
//! | DBP       | 20..=200                             |
//! | Temp      | 30.0..=45.0                          |
//! | SpO2      | 0..=100                              |
//! | GCS       | 3..=15                               |
//! | Resources | 0..=max_resources (clamped)          |
//!
//! The engine never calls into this module. Integrators that want strict
//! input handling run it upstream of scoring.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vitals::{VitalSign, Vitals};

/// Outcome of checking one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    Ok,
    Clamped,
    Invalid,
    Missing,
}

/// Inclusive physiological bounds for a vital sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalBounds {
    pub min: f64,
    pub max: f64,
}

impl VitalBounds {
    pub fn of(sign: VitalSign) -> Self {
        let (min, max) = match sign {
            VitalSign::HeartRate => (20.0, 300.0),
            VitalSign::RespiratoryRate => (0.0, 60.0),
            VitalSign::Systolic => (40.0, 300.0),
            VitalSign::Diastolic => (20.0, 200.0),
            VitalSign::Temperature => (30.0, 45.0),
            VitalSign::OxygenSaturation => (0.0, 100.0),
            VitalSign::Gcs => (3.0, 15.0),
        };
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Per-field validation result for one [`Vitals`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsReport {
    /// No present field is out of bounds.
    pub valid: bool,
    /// Statuses in [`VitalSign::ALL`] order.
    pub statuses: [FieldStatus; VitalSign::COUNT],
    /// Input with every present field forced into bounds.
    pub clamped: Vitals,
}

impl VitalsReport {
    pub fn status(&self, sign: VitalSign) -> FieldStatus {
        self.statuses[sign.index()]
    }

    pub fn invalid_fields(&self) -> impl Iterator<Item = VitalSign> + '_ {
        VitalSign::ALL
            .into_iter()
            .filter(|sign| matches!(self.status(*sign), FieldStatus::Invalid | FieldStatus::Clamped))
    }
}

fn check(value: f64, sign: VitalSign) -> FieldStatus {
    if value == 0.0 {
        FieldStatus::Missing
    } else if VitalBounds::of(sign).contains(value) {
        FieldStatus::Ok
    } else {
        FieldStatus::Invalid
    }
}

/// Check every field against [`VitalBounds`]. Does not modify `vitals`.
pub fn validate_vitals(vitals: &Vitals) -> VitalsReport {
    let statuses = VitalSign::ALL.map(|sign| check(vitals.value(sign), sign));
    VitalsReport {
        valid: !statuses.contains(&FieldStatus::Invalid),
        statuses,
        clamped: clamp_vitals(vitals),
    }
}

pub fn vitals_valid(vitals: &Vitals) -> bool {
    validate_vitals(vitals).valid
}

fn clamp_int(value: i32, sign: VitalSign) -> i32 {
    if value == 0 {
        return 0;
    }
    let bounds = VitalBounds::of(sign);
    // Integer vitals have integral bounds.
    value.clamp(bounds.min as i32, bounds.max as i32)
}

/// Force present fields into bounds; missing (zero) fields stay zero.
pub fn clamp_vitals(vitals: &Vitals) -> Vitals {
    let temp = if vitals.temp == 0.0 {
        0.0
    } else {
        VitalBounds::of(VitalSign::Temperature).clamp(vitals.temp)
    };
    Vitals {
        hr: clamp_int(vitals.hr, VitalSign::HeartRate),
        rr: clamp_int(vitals.rr, VitalSign::RespiratoryRate),
        sbp: clamp_int(vitals.sbp, VitalSign::Systolic),
        dbp: clamp_int(vitals.dbp, VitalSign::Diastolic),
        temp,
        spo2: clamp_int(vitals.spo2, VitalSign::OxygenSaturation),
        gcs: clamp_int(vitals.gcs, VitalSign::Gcs),
    }
}

/// Clamp only when something is out of bounds; affected fields report
/// [`FieldStatus::Clamped`].
pub fn sanitize_vitals(vitals: &Vitals) -> (Vitals, VitalsReport) {
    let mut report = validate_vitals(vitals);
    if report.valid {
        return (*vitals, report);
    }
    for status in report.statuses.iter_mut() {
        if *status == FieldStatus::Invalid {
            *status = FieldStatus::Clamped;
        }
    }
    (report.clamped, report)
}

pub fn at_least_one_vital(vitals: &Vitals) -> bool {
    vitals.has_any()
}

/// `count` clamped to `[0, max_resources]`; 0 when `max_resources <= 0`.
pub fn clamp_resource_count(count: i32, max_resources: i32) -> i32 {
    if max_resources <= 0 {
        return 0;
    }
    count.clamp(0, max_resources)
}

/// Vitals in bounds and resource count in `[0, max_resources]`.
pub fn vitals_and_resources_valid(vitals: &Vitals, resource_count: i32, max_resources: i32) -> bool {
    if !vitals_valid(vitals) {
        return false;
    }
    if max_resources <= 0 {
        return resource_count == 0;
    }
    (0..=max_resources).contains(&resource_count)
}

/// Plain description of a parameter set, kept independent of
/// [`Params`](crate::Params) so this validator has no dependency on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamsLike {
    pub vital_weights: [f64; VitalSign::COUNT],
    pub max_resources: i32,
    pub resource_weight: f64,
    pub thresholds: [f64; 4],
}

/// Which parts of a parameter set passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamsReport {
    pub valid: bool,
    pub weights_ok: bool,
    pub thresholds_ok: bool,
    pub max_resources_ok: bool,
    pub resource_weight_ok: bool,
}

impl fmt::Display for ParamsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return f.write_str("ok");
        }
        let failed: Vec<&str> = [
            (self.weights_ok, "vital weights outside [0, 1]"),
            (self.thresholds_ok, "thresholds not 1 >= t1 > t2 > t3 > t4 > 0"),
            (self.max_resources_ok, "max_resources negative"),
            (self.resource_weight_ok, "resource_weight negative or not finite"),
        ]
        .into_iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, reason)| reason)
        .collect();
        f.write_str(&failed.join("; "))
    }
}

pub fn validate_params(params: &ParamsLike) -> ParamsReport {
    let weights_ok = params
        .vital_weights
        .iter()
        .all(|w| w.is_finite() && (0.0..=1.0).contains(w));
    let max_resources_ok = params.max_resources >= 0;
    let resource_weight_ok = params.resource_weight.is_finite() && params.resource_weight >= 0.0;
    let [t1, t2, t3, t4] = params.thresholds;
    let thresholds_ok = t1 > t2 && t2 > t3 && t3 > t4 && t4 > 0.0 && t1 <= 1.0;
    ParamsReport {
        valid: weights_ok && max_resources_ok && resource_weight_ok && thresholds_ok,
        weights_ok,
        thresholds_ok,
        max_resources_ok,
        resource_weight_ok,
    }
}

pub fn params_valid(params: &ParamsLike) -> bool {
    validate_params(params).valid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> Vitals {
        Vitals {
            hr: 120,
            rr: 24,
            sbp: 90,
            dbp: 60,
            spo2: 92,
            ..Vitals::default()
        }
    }

    #[test]
    fn in_range_vitals_are_ok_and_zero_is_missing() {
        let report = validate_vitals(&example());
        assert!(report.valid);
        assert_eq!(report.status(VitalSign::HeartRate), FieldStatus::Ok);
        assert_eq!(report.status(VitalSign::Temperature), FieldStatus::Missing);
        assert_eq!(report.status(VitalSign::Gcs), FieldStatus::Missing);
        assert_eq!(report.invalid_fields().count(), 0);
    }

    #[test]
    fn out_of_range_values_are_invalid() {
        let vitals = Vitals {
            hr: 400,
            temp: 50.0,
            gcs: -2,
            ..example()
        };
        let report = validate_vitals(&vitals);
        assert!(!report.valid);
        assert_eq!(report.status(VitalSign::HeartRate), FieldStatus::Invalid);
        assert_eq!(report.status(VitalSign::Temperature), FieldStatus::Invalid);
        assert_eq!(report.status(VitalSign::Gcs), FieldStatus::Invalid);
        assert_eq!(report.invalid_fields().count(), 3);
    }

    #[test]
    fn clamping_keeps_missing_fields() {
        let vitals = Vitals {
            hr: 10,
            sbp: 400,
            temp: 28.5,
            ..Vitals::default()
        };
        let clamped = clamp_vitals(&vitals);
        assert_eq!(clamped.hr, 20);
        assert_eq!(clamped.sbp, 300);
        assert_eq!(clamped.temp, 30.0);
        assert_eq!(clamped.rr, 0);
        assert_eq!(clamped.gcs, 0);
    }

    #[test]
    fn sanitize_marks_clamped_fields() {
        let (clean, report) = sanitize_vitals(&example());
        assert_eq!(clean, example());
        assert!(report.valid);

        let (clean, report) = sanitize_vitals(&Vitals { spo2: 140, ..example() });
        assert_eq!(clean.spo2, 100);
        assert_eq!(report.status(VitalSign::OxygenSaturation), FieldStatus::Clamped);
        assert_eq!(report.status(VitalSign::HeartRate), FieldStatus::Ok);
        assert!(vitals_valid(&clean));
    }

    #[test]
    fn resource_count_is_clamped() {
        assert_eq!(clamp_resource_count(3, 6), 3);
        assert_eq!(clamp_resource_count(10, 6), 6);
        assert_eq!(clamp_resource_count(-1, 6), 0);
        assert_eq!(clamp_resource_count(3, 0), 0);
        assert!(vitals_and_resources_valid(&example(), 6, 6));
        assert!(!vitals_and_resources_valid(&example(), 7, 6));
        assert!(vitals_and_resources_valid(&example(), 0, 0));
        assert!(!vitals_and_resources_valid(&example(), 1, 0));
    }

    #[test]
    fn params_report_flags_each_failure() {
        let mut like = ParamsLike {
            vital_weights: [0.18, 0.22, 0.16, 0.10, 0.08, 0.16, 0.10],
            max_resources: 6,
            resource_weight: 0.25,
            thresholds: [0.85, 0.60, 0.35, 0.15],
        };
        assert!(params_valid(&like));
        assert_eq!(validate_params(&like).to_string(), "ok");

        like.thresholds = [0.5, 0.6, 0.35, 0.15];
        like.resource_weight = f64::INFINITY;
        let report = validate_params(&like);
        assert!(!report.valid);
        assert!(!report.thresholds_ok);
        assert!(!report.resource_weight_ok);
        assert!(report.weights_ok && report.max_resources_ok);
        assert!(report.to_string().contains("thresholds"));
    }

    #[test]
    fn at_least_one_vital_requires_a_measurement() {
        assert!(!at_least_one_vital(&Vitals::default()));
        assert!(at_least_one_vital(&Vitals {
            temp: 39.1,
            ..Vitals::default()
        }));
    }
}
