// src/process/mod.rs
pub mod date_parser;
pub mod raw_table;
pub mod series;
pub mod utils;

pub use raw_table::RawTable;
pub use series::{build_series, Series, SeriesColumn, SeriesSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{ChartError, Result};
use utils::clean_str;

/// Payload shape of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Guess from the file name, then from the first non-blank byte.
    #[default]
    Auto,
    Csv,
    Json,
}

impl SourceFormat {
    /// Settle `Auto` into a concrete format.
    pub fn resolve(self, file_name: Option<&str>, body: &str) -> SourceFormat {
        match self {
            SourceFormat::Auto => {
                let by_name = file_name.map(|n| n.to_ascii_lowercase());
                match by_name.as_deref() {
                    Some(n) if n.ends_with(".json") => SourceFormat::Json,
                    Some(n) if n.ends_with(".csv") => SourceFormat::Csv,
                    _ if body.trim_start().starts_with(['[', '{']) => SourceFormat::Json,
                    _ => SourceFormat::Csv,
                }
            }
            other => other,
        }
    }
}

/// Split `text` into a header and data rows.
///
/// - lines are trimmed; empty/whitespace-only lines are dropped
/// - the first surviving line is the header
/// - every line is split on `delimiter` with no quote handling
pub fn parse_delimited(text: &str, delimiter: char) -> RawTable {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let Some(header_line) = lines.next() else {
        debug!("no non-blank lines in payload");
        return RawTable::default();
    };
    let split = |line: &str| -> Vec<String> { line.split(delimiter).map(clean_str).collect() };

    let headers = split(header_line);
    let rows: Vec<Vec<String>> = lines.map(split).collect();

    debug!(columns = headers.len(), rows = rows.len(), "parsed delimited payload");
    RawTable { headers, rows }
}

/// Turn a JSON array of records into the same shape as a delimited payload.
///
/// The header is `date_column` followed by the other keys of the first record
/// in document order. Missing keys and `null`s become empty cells, which the
/// series builder treats as missing points.
pub fn parse_json_records(text: &str, date_column: &str) -> Result<RawTable> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ChartError::Decode(format!("invalid JSON: {e}")))?;

    let records = match value {
        Value::Array(records) => records,
        Value::Object(obj) => {
            // the data endpoint answers `{"error": "..."}` with a 500
            if let Some(err) = obj.get("error") {
                return Err(ChartError::fetch("endpoint", cell_text(err)));
            }
            return Err(ChartError::Decode(
                "expected a JSON array of records, found an object".into(),
            ));
        }
        other => {
            return Err(ChartError::Decode(format!(
                "expected a JSON array of records, found {}",
                json_kind(&other)
            )))
        }
    };

    let Some(first) = records.first() else {
        return Ok(RawTable::default());
    };
    let first = first
        .as_object()
        .ok_or_else(|| ChartError::Decode("record 0 is not an object".into()))?;

    let mut headers = vec![date_column.to_string()];
    headers.extend(first.keys().filter(|k| *k != date_column).cloned());

    let mut rows = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        let obj = record
            .as_object()
            .ok_or_else(|| ChartError::Decode(format!("record {idx} is not an object")))?;
        let row: Vec<String> = headers
            .iter()
            .map(|h| obj.get(h).map(cell_text).unwrap_or_default())
            .collect();
        trace!(idx, ?row, "json record");
        rows.push(row);
    }

    debug!(columns = headers.len(), rows = rows.len(), "parsed JSON records");
    Ok(RawTable { headers, rows })
}

/// Parse `text` in the given (already resolved) format.
pub fn decode(
    text: &str,
    format: SourceFormat,
    delimiter: char,
    date_column: &str,
) -> Result<RawTable> {
    match format {
        SourceFormat::Json => parse_json_records(text, date_column),
        SourceFormat::Csv | SourceFormat::Auto => Ok(parse_delimited(text, delimiter)),
    }
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
