//! CSV output. Fields are quoted only when they contain a comma, a quote,
//! a line break or a leading space; rows end with `\n`.

use std::borrow::Cow;
use std::io::Write;

use chrono::SecondsFormat;

use crate::record::TriageRecord;
use crate::ExportError;

pub const CSV_HEADER: [&str; 13] = [
    "hr",
    "rr",
    "sbp",
    "dbp",
    "temp",
    "spo2",
    "gcs",
    "resource_count",
    "acuity",
    "level",
    "level_label",
    "timestamp",
    "id",
];

/// Cells of one record in [`CSV_HEADER`] order, unquoted.
pub fn to_csv_row(record: &TriageRecord) -> Vec<String> {
    vec![
        record.hr.to_string(),
        record.rr.to_string(),
        record.sbp.to_string(),
        record.dbp.to_string(),
        record.temp.to_string(),
        record.spo2.to_string(),
        record.gcs.to_string(),
        record.resource_count.to_string(),
        record.acuity.to_string(),
        record.level.as_u8().to_string(),
        record.level_label.clone(),
        record
            .timestamp
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default(),
        record.id.clone().unwrap_or_default(),
    ]
}

fn escape(field: &str) -> Cow<'_, str> {
    let needs_quotes = field.starts_with(' ')
        || field.contains(|c: char| matches!(c, ',' | '"' | '\r' | '\n'));
    if needs_quotes {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

pub(crate) fn write_row<W, I, S>(writer: &mut W, fields: I) -> Result<(), ExportError>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let line = fields
        .into_iter()
        .map(|field| escape(field.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join(",");
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Header followed by one row per record.
pub fn write_csv<W: Write>(mut writer: W, records: &[TriageRecord]) -> Result<(), ExportError> {
    write_row(&mut writer, CSV_HEADER)?;
    for record in records {
        write_row(&mut writer, to_csv_row(record))?;
    }
    writer.flush()?;
    Ok(())
}
