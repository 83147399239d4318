//! Decode fetched bytes into a [`Table`].
//!
//! Every cell is read as text — no type inference — so leading zeros and
//! date-like strings reach the destination verbatim instead of being coerced.

use courtsync_core::{config::SourceFormat, Table};
use serde_json::Value;

use crate::error::SyncError;

/// Decode `bytes` according to the configured source format.
pub fn decode(
    format: SourceFormat,
    records_key: Option<&str>,
    bytes: &[u8],
) -> Result<Table, SyncError> {
    match format {
        SourceFormat::Csv => decode_csv(bytes),
        SourceFormat::Json => decode_json(bytes, records_key),
    }
}

/// CSV: first record is the header, the rest are data rows.
///
/// The reader is flexible — short rows are padded to header width by
/// [`Table::from_rows`]; rows wider than the header are rejected there.
pub fn decode_csv(bytes: &[u8]) -> Result<Table, SyncError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        if headers.is_empty() {
            headers = cells;
        } else {
            rows.push(cells);
        }
    }
    Ok(Table::from_rows(headers, rows)?)
}

/// JSON: a list of uniform records, optionally under `records_key`.
///
/// Columns come from the first record in document order; later records may
/// omit keys (rendered as empty cells) but may not introduce new ones.
pub fn decode_json(bytes: &[u8], records_key: Option<&str>) -> Result<Table, SyncError> {
    let document: Value = serde_json::from_slice(bytes)?;
    let records = match records_key {
        Some(key) => document.get(key).ok_or_else(|| SyncError::JsonShape {
            reason: format!("document has no '{key}' key"),
        })?,
        None => &document,
    };
    let records = records.as_array().ok_or_else(|| SyncError::JsonShape {
        reason: "expected an array of records".to_string(),
    })?;

    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let object = record.as_object().ok_or_else(|| SyncError::JsonShape {
            reason: format!("record {} is not an object", index + 1),
        })?;
        if headers.is_empty() {
            headers = object.keys().cloned().collect();
        } else if let Some(unknown) = object.keys().find(|key| !headers.contains(*key)) {
            return Err(SyncError::JsonShape {
                reason: format!("record {} has unexpected key '{unknown}'", index + 1),
            });
        }
        let row = headers
            .iter()
            .map(|key| cell_text(object.get(key)))
            .collect();
        rows.push(row);
    }
    Ok(Table::from_rows(headers, rows)?)
}

/// Render one JSON value as cell text. Strings pass through unquoted; null
/// and absent values are empty; numbers and booleans keep their JSON form.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
