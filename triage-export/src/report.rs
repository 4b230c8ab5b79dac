//! Per-level report and whole-batch summary over exported records.

use std::io::Write;

use serde::{Deserialize, Serialize};
use triage_core::{Level, LevelCounts};

use crate::csv::write_row;
use crate::record::TriageRecord;
use crate::ExportError;

pub const LEVEL_REPORT_HEADER: [&str; 7] = [
    "level",
    "level_label",
    "count",
    "pct",
    "mean_acuity",
    "min_acuity",
    "max_acuity",
];

/// One line of the level report. Acuity fields are 0 for an empty level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelReportRow {
    pub level: Level,
    pub level_label: String,
    pub count: usize,
    /// Share of all records, in percent.
    pub pct: f64,
    pub mean_acuity: f64,
    pub min_acuity: f64,
    pub max_acuity: f64,
}

impl LevelReportRow {
    pub fn to_csv_row(&self) -> [String; 7] {
        [
            self.level.as_u8().to_string(),
            self.level_label.clone(),
            self.count.to_string(),
            format!("{:.2}", self.pct),
            format!("{:.4}", self.mean_acuity),
            format!("{:.4}", self.min_acuity),
            format!("{:.4}", self.max_acuity),
        ]
    }
}

/// Exactly five rows, level 1 first.
pub fn level_report(records: &[TriageRecord]) -> Vec<LevelReportRow> {
    let total = records.len();
    Level::ALL
        .iter()
        .map(|level| {
            let acuities: Vec<f64> = records
                .iter()
                .filter(|r| r.level == *level)
                .map(|r| r.acuity)
                .collect();
            let count = acuities.len();
            let (mean_acuity, min_acuity, max_acuity) = if count == 0 {
                (0.0, 0.0, 0.0)
            } else {
                (
                    acuities.iter().sum::<f64>() / count as f64,
                    acuities.iter().copied().fold(f64::INFINITY, f64::min),
                    acuities.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                )
            };
            let pct = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            };
            LevelReportRow {
                level: *level,
                level_label: level.label().to_string(),
                count,
                pct,
                mean_acuity,
                min_acuity,
                max_acuity,
            }
        })
        .collect()
}

pub fn write_level_report_csv<W: Write>(
    mut writer: W,
    records: &[TriageRecord],
) -> Result<(), ExportError> {
    write_row(&mut writer, LEVEL_REPORT_HEADER)?;
    for row in level_report(records) {
        write_row(&mut writer, row.to_csv_row())?;
    }
    writer.flush()?;
    Ok(())
}

/// Aggregate acuity and level distribution of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub n: usize,
    pub mean_acuity: f64,
    pub min_acuity: f64,
    pub max_acuity: f64,
    pub level_counts: LevelCounts,
}

/// All zero for an empty slice.
pub fn compute_summary(records: &[TriageRecord]) -> ExportSummary {
    if records.is_empty() {
        return ExportSummary::default();
    }
    let n = records.len();
    let mut summary = ExportSummary {
        n,
        min_acuity: f64::INFINITY,
        max_acuity: f64::NEG_INFINITY,
        level_counts: LevelCounts::from_levels(records.iter().map(|r| r.level)),
        ..ExportSummary::default()
    };
    for record in records {
        summary.mean_acuity += record.acuity;
        summary.min_acuity = summary.min_acuity.min(record.acuity);
        summary.max_acuity = summary.max_acuity.max(record.acuity);
    }
    summary.mean_acuity /= n as f64;
    summary
}
