// src/catalog/types.rs

use serde::{Deserialize, Serialize};

use crate::process::{SeriesColumn, SourceFormat};

/// Where the table comes from and how to read it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct SourceConfig {
    /// File path or `http(s)://` URL.
    pub locator: String,
    #[serde(default)]
    pub format: SourceFormat,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Name given to the date column of JSON records.
    #[serde(default = "default_date_column")]
    pub date_column: String,
}

fn default_delimiter() -> char {
    ','
}

fn default_date_column() -> String {
    "Date".into()
}

impl SourceConfig {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            format: SourceFormat::Auto,
            delimiter: default_delimiter(),
            date_column: default_date_column(),
        }
    }
}

/// Everything needed to draw one chart type.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ChartSpec {
    pub title: String,
    /// Survey question shown next to the chart.
    #[serde(default)]
    pub question: String,
    pub series: Vec<SeriesColumn>,
    /// Initial y axis `[min, max]`; fitted to the data when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_range: Option<[f64; 2]>,
    /// Initial x axis window as `YYYY-MM-DD` labels; all data when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_range: Option<[String; 2]>,
}

impl ChartSpec {
    pub fn columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.series.iter().map(|s| s.column.as_str())
    }
}
