use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use triage_core::{Evaluation, Level, Vitals};

use crate::ExportError;

/// One evaluation flattened for export: inputs, score, level and optional
/// metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageRecord {
    pub hr: i32,
    pub rr: i32,
    pub sbp: i32,
    pub dbp: i32,
    pub temp: f64,
    pub spo2: i32,
    pub gcs: i32,
    pub resource_count: i32,
    pub acuity: f64,
    pub level: Level,
    pub level_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Encounter or record identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl TriageRecord {
    pub fn new(vitals: &Vitals, resource_count: i32, acuity: f64, level: Level) -> Self {
        Self {
            hr: vitals.hr,
            rr: vitals.rr,
            sbp: vitals.sbp,
            dbp: vitals.dbp,
            temp: vitals.temp,
            spo2: vitals.spo2,
            gcs: vitals.gcs,
            resource_count,
            acuity,
            level,
            level_label: level.label().to_string(),
            timestamp: None,
            id: None,
        }
    }

    pub fn from_evaluation(vitals: &Vitals, resource_count: i32, evaluation: &Evaluation) -> Self {
        Self::new(vitals, resource_count, evaluation.acuity, evaluation.level)
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The vitals as recorded, e.g. for re-scoring under other parameters.
    pub fn vitals(&self) -> Vitals {
        Vitals {
            hr: self.hr,
            rr: self.rr,
            sbp: self.sbp,
            dbp: self.dbp,
            temp: self.temp,
            spo2: self.spo2,
            gcs: self.gcs,
        }
    }

    pub fn to_json_string(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Write as one JSON object followed by a newline.
    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<(), ExportError> {
        serde_json::to_writer(&mut writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// A set of records with generation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBatch {
    pub results: Vec<TriageRecord>,
    pub generated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ExportBatch {
    /// Stamped with the current time.
    pub fn new(results: Vec<TriageRecord>) -> Self {
        Self {
            results,
            generated: Utc::now(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn to_json_string(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<(), ExportError> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

pub fn read_record_json<R: Read>(reader: R) -> Result<TriageRecord, ExportError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn read_batch_json<R: Read>(reader: R) -> Result<ExportBatch, ExportError> {
    Ok(serde_json::from_reader(reader)?)
}
