use thiserror::Error;

use crate::validate::ParamsReport;

/// Errors surfaced by the scoring core.
///
/// Scoring itself never fails; these cover the checks callers opt into and
/// the one hard failure of the batch API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TriageError {
    #[error("batch length mismatch: {vitals} vitals vs {resource_counts} resource counts")]
    BatchLengthMismatch {
        vitals: usize,
        resource_counts: usize,
    },

    #[error("invalid parameter set: {0}")]
    InvalidParams(ParamsReport),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("invalid triage level: {0}")]
    InvalidLevel(String),
}
