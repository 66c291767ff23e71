//! Bulk Export
//!
//! Turns the unpaginated `/<entity>/all` listing into a file. Columns come
//! from the entity's field descriptors, narrowed to the user's saved
//! preference when one exists.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::client::{EntityKind, FieldDescriptor, Record};

/// Output file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Ndjson,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Ndjson => "ndjson",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "ndjson" | "jsonl" => Ok(ExportFormat::Ndjson),
            other => Err(format!("Unknown export format: {}", other)),
        }
    }
}

/// Export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pick export columns
///
/// With a non-empty selection, columns follow the selection order; keys
/// without a descriptor use the key as label. Otherwise every descriptor is
/// used, and with no descriptors either, the union of record keys.
pub fn resolve_columns(
    fields: &[FieldDescriptor],
    selected: Option<&[String]>,
    records: &[Record],
) -> Vec<FieldDescriptor> {
    if let Some(selected) = selected.filter(|s| !s.is_empty()) {
        return selected
            .iter()
            .map(|key| {
                fields
                    .iter()
                    .find(|f| &f.field_key == key)
                    .cloned()
                    .unwrap_or_else(|| FieldDescriptor::new(key.clone(), key.clone()))
            })
            .collect();
    }

    if !fields.is_empty() {
        return fields.to_vec();
    }

    let keys: BTreeSet<&String> = records.iter().flat_map(|r| r.keys()).collect();
    keys.into_iter()
        .map(|k| FieldDescriptor::new(k.clone(), k.clone()))
        .collect()
}

/// Render records in the given format
pub fn render(
    records: &[Record],
    columns: &[FieldDescriptor],
    format: ExportFormat,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => format_csv(records, columns),
        ExportFormat::Json => format_json(records, columns),
        ExportFormat::Ndjson => format_ndjson(records, columns),
    }
}

fn format_csv(records: &[Record], columns: &[FieldDescriptor]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(columns.iter().map(|c| c.field_label.as_str()))?;
    for record in records {
        writer.write_record(columns.iter().map(|c| cell(record, &c.field_key)))?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn format_json(records: &[Record], columns: &[FieldDescriptor]) -> Result<String, ExportError> {
    let projected: Vec<Record> = records.iter().map(|r| project(r, columns)).collect();
    Ok(serde_json::to_string_pretty(&projected)?)
}

fn format_ndjson(records: &[Record], columns: &[FieldDescriptor]) -> Result<String, ExportError> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(&project(record, columns))?);
        out.push('\n');
    }
    Ok(out)
}

/// Keep only the exported columns; missing values become null
fn project(record: &Record, columns: &[FieldDescriptor]) -> Record {
    columns
        .iter()
        .map(|c| {
            let value = record
                .get(&c.field_key)
                .cloned()
                .unwrap_or(serde_json::Value::Null);
            (c.field_key.clone(), value)
        })
        .collect()
}

fn cell(record: &Record, key: &str) -> String {
    match record.get(key) {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `<entity>_export_<YYYYmmdd_HHMMSS>.<ext>`
pub fn default_filename(kind: EntityKind, format: ExportFormat, at: DateTime<Utc>) -> String {
    format!(
        "{}_export_{}.{}",
        kind,
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Render and write an export file, returning the number of bytes written
pub fn write_file(
    path: &Path,
    records: &[Record],
    columns: &[FieldDescriptor],
    format: ExportFormat,
) -> Result<usize, ExportError> {
    let content = render(records, columns, format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &content)?;

    tracing::info!(path = %path.display(), records = records.len(), %format, "Export written");
    Ok(content.len())
}

/// Default output path inside `dir`
pub fn default_path(dir: &Path, kind: EntityKind, format: ExportFormat) -> PathBuf {
    dir.join(default_filename(kind, format, Utc::now()))
}
