// src/error.rs

use thiserror::Error;

/// Everything the load → build → render pipeline can fail with.
///
/// Numeric coercion failures never surface here: a cell that does not parse
/// becomes a missing point inside its series.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("failed to fetch {locator}: {message}")]
    Fetch { locator: String, message: String },

    #[error("column {column:?} not found in header (available: {available:?})")]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("unknown chart type {chart_type:?} (known: {known:?})")]
    UnknownChartType {
        chart_type: String,
        known: Vec<String>,
    },

    #[error("could not decode payload: {0}")]
    Decode(String),

    #[error("invalid chart catalog: {0}")]
    Config(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl ChartError {
    pub(crate) fn fetch(locator: impl ToString, message: impl ToString) -> Self {
        ChartError::Fetch {
            locator: locator.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn column_not_found(column: &str, available: &[String]) -> Self {
        ChartError::ColumnNotFound {
            column: column.to_string(),
            available: available.to_vec(),
        }
    }
}

pub type Result<T, E = ChartError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_not_found_names_column_and_header() {
        let header = vec!["Date".to_string(), "A".to_string(), "B".to_string()];
        let msg = ChartError::column_not_found("C", &header).to_string();
        assert!(msg.contains("\"C\""), "{msg}");
        assert!(msg.contains(r#"["Date", "A", "B"]"#), "{msg}");
    }
}
