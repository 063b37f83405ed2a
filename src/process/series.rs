// src/process/series.rs

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{utils::parse_cell, RawTable};
use crate::error::{ChartError, Result};

/// One entry of a chart's column mapping: series `key` ← header `column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesColumn {
    pub key: String,
    pub column: String,
    /// Legend text; falls back to `key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// CSS colour for the line, e.g. `"#00356B"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SeriesColumn {
    pub fn new(key: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            column: column.into(),
            label: None,
            color: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }
}

/// A named, date-aligned sequence of observations.
///
/// `timestamps` and `values` only grow together through [`Series::push`], so
/// they always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    key: String,
    label: String,
    color: Option<String>,
    timestamps: Vec<String>,
    values: Vec<Option<f64>>,
}

impl Series {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            color: None,
            timestamps: Vec::new(),
            values: Vec::new(),
        }
    }

    fn for_column(col: &SeriesColumn, capacity: usize) -> Self {
        Self {
            key: col.key.clone(),
            label: col.display_label().to_string(),
            color: col.color.clone(),
            timestamps: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, timestamp: impl Into<String>, value: Option<f64>) {
        self.timestamps.push(timestamp.into());
        self.values.push(value);
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn timestamps(&self) -> &[String] {
        &self.timestamps
    }

    /// `None` is a missing point (the cell did not parse as a number).
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Min and max over present values.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Output of [`build_series`], in mapping order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSet {
    series: Vec<Series>,
}

impl SeriesSet {
    pub fn get(&self, key: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.key == key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Series> {
        self.series.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.series.iter().map(|s| s.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl<'a> IntoIterator for &'a SeriesSet {
    type Item = &'a Series;
    type IntoIter = std::slice::Iter<'a, Series>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.iter()
    }
}

impl FromIterator<Series> for SeriesSet {
    fn from_iter<I: IntoIterator<Item = Series>>(iter: I) -> Self {
        Self {
            series: iter.into_iter().collect(),
        }
    }
}

/// Build one [`Series`] per mapping entry from `table`.
///
/// Every column is resolved before any row is read, so a bad mapping fails
/// with [`ChartError::ColumnNotFound`] instead of yielding an empty series.
/// Cells that do not parse as numbers become `None`; rows are never dropped.
#[instrument(level = "debug", skip_all, fields(rows = table.rows.len(), series = mapping.len()))]
pub fn build_series(table: &RawTable, mapping: &[SeriesColumn]) -> Result<SeriesSet> {
    let indices: Vec<usize> = mapping
        .iter()
        .map(|col| {
            table
                .column_index(&col.column)
                .ok_or_else(|| ChartError::column_not_found(&col.column, &table.headers))
        })
        .collect::<Result<_>>()?;

    let mut out: Vec<Series> = mapping
        .iter()
        .map(|col| Series::for_column(col, table.rows.len()))
        .collect();

    for row in &table.rows {
        let date = row.first().map(String::as_str).unwrap_or_default();
        for (series, &idx) in out.iter_mut().zip(&indices) {
            let value = row.get(idx).and_then(|cell| parse_cell(cell));
            series.push(date, value);
        }
    }

    for s in &out {
        let missing = s.missing_count();
        if missing > 0 {
            debug!(key = %s.key, missing, total = s.len(), "cells coerced to missing");
        }
    }

    Ok(SeriesSet { series: out })
}
