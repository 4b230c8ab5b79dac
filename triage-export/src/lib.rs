//! Flat export records for triage evaluations.
//!
//! | Format | Use case                         |
//! |--------|----------------------------------|
//! | JSON   | APIs, logs, single record/batch  |
//! | CSV    | Batch export, spreadsheets       |
//! | Report | Per-level counts and acuity      |

use thiserror::Error;

pub mod csv;
pub mod record;
pub mod report;

pub use csv::{to_csv_row, write_csv, CSV_HEADER};
pub use record::{read_batch_json, read_record_json, ExportBatch, TriageRecord};
pub use report::{
    compute_summary, level_report, write_level_report_csv, ExportSummary, LevelReportRow,
};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
