//! CSV export
//!
//! Every value is JSON-stringified into its cell: strings keep their JSON
//! quoting (which doubles as CSV escaping for commas and embedded quotes),
//! numbers and booleans are bare, and null becomes an empty cell. The header
//! row is taken from the first record's field names; later records are read
//! through those same keys so every row has the same column order.

use crate::{Error, Result};
use serde_json::Value;

/// Render a slice of JSON objects as a CSV document
///
/// Returns an empty string for an empty slice. Records must be JSON objects.
pub fn to_csv(records: &[Value]) -> Result<String> {
    let first = match records.first() {
        Some(v) => v,
        None => return Ok(String::new()),
    };

    let header_map = first
        .as_object()
        .ok_or_else(|| Error::Validation("CSV records must be JSON objects".to_string()))?;
    let keys: Vec<&String> = header_map.keys().collect();

    let mut out = String::new();
    out.push_str(
        &keys
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(","),
    );
    out.push('\n');

    for record in records {
        let obj = record
            .as_object()
            .ok_or_else(|| Error::Validation("CSV records must be JSON objects".to_string()))?;
        let row: Vec<String> = keys
            .iter()
            .map(|k| match obj.get(*k) {
                None | Some(Value::Null) => String::new(),
                Some(v) => v.to_string(),
            })
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    Ok(out)
}

/// Build a dated export filename: `<name>_<YYYY-MM-DD>.csv`
pub fn csv_filename(name: &str, date: chrono::DateTime<chrono::Utc>) -> String {
    format!("{}_{}.csv", name, date.format("%Y-%m-%d"))
}
