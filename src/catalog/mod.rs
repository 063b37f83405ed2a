// src/catalog/mod.rs
pub mod types;

pub use types::{ChartSpec, SourceConfig};

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};
use tracing::{debug, info, instrument};

use crate::error::{ChartError, Result};
use crate::process::SeriesColumn;

pub const DEFAULT_SOURCE: &str = "static/data/confidence_indices.csv";

const CORPORATE_COLOR: &str = "#00356B";
const INDIVIDUAL_COLOR: &str = "#FF6B6B";

/// The fixed set of chart types plus the source they read from.
///
/// Built once at startup and then only read.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Catalog {
    pub source: SourceConfig,
    pub charts: BTreeMap<String, ChartSpec>,
}

impl Default for Catalog {
    fn default() -> Self {
        let charts = [
            (
                "one-year",
                "U.S. One-Year Confidence Index",
                "1-Year Confidence",
                "Percent of the population expecting an increase in the Dow in the coming year.",
            ),
            (
                "crash",
                "U.S. Crash Confidence Index",
                "Crash Confidence",
                "Percent of the population who attach little probability to a stock market \
                 crash in the next six months.",
            ),
            (
                "buy-dips",
                "U.S. Buy-on-Dips Confidence Index",
                "Buy-On-Dips Confidence",
                "Percent of the population expecting a rebound the next day should the market \
                 ever drop 3% in one day.",
            ),
            (
                "valuation",
                "U.S. Valuation Confidence Index",
                "Valuation Confidence",
                "Percent of the population who think that the market is not too high.",
            ),
        ]
        .into_iter()
        .map(|(chart_type, title, stem, question)| {
            let spec = ChartSpec {
                title: title.into(),
                question: question.into(),
                series: vec![
                    SeriesColumn::new("corporate", format!("{stem} (Corporate)"))
                        .with_label("Corporate")
                        .with_color(CORPORATE_COLOR),
                    SeriesColumn::new("individual", format!("{stem} (Individual)"))
                        .with_label("Individual")
                        .with_color(INDIVIDUAL_COLOR),
                ],
                y_range: Some([40.0, 100.0]),
                x_range: Some(["2005-01-01".into(), "2024-01-01".into()]),
            };
            (chart_type.to_string(), spec)
        })
        .collect();

        Self {
            source: SourceConfig::new(DEFAULT_SOURCE),
            charts,
        }
    }
}

impl Catalog {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let catalog: Catalog =
            serde_yaml::from_str(text).map_err(|e| ChartError::Config(e.to_string()))?;
        catalog.check_shape()?;
        Ok(catalog)
    }

    #[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_yaml_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| {
            ChartError::Config(format!("reading {}: {}", path.as_ref().display(), e))
        })?;
        let catalog = Self::from_yaml_str(&text)?;
        info!(charts = catalog.charts.len(), "loaded chart catalog");
        Ok(catalog)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ChartError::Config(e.to_string()))
    }

    pub fn chart_types(&self) -> impl Iterator<Item = &str> + '_ {
        self.charts.keys().map(String::as_str)
    }

    pub fn chart(&self, chart_type: &str) -> Result<&ChartSpec> {
        self.charts
            .get(chart_type)
            .ok_or_else(|| ChartError::UnknownChartType {
                chart_type: chart_type.to_string(),
                known: self.charts.keys().cloned().collect(),
            })
    }

    /// Fail fast when any configured column is absent from `headers`.
    /// Charts are checked in name order, series in declaration order.
    pub fn validate_columns(&self, headers: &[String]) -> Result<()> {
        for (chart_type, spec) in &self.charts {
            for column in spec.columns() {
                if !headers.iter().any(|h| h == column) {
                    debug!(chart_type = %chart_type, column, "configured column missing");
                    return Err(ChartError::column_not_found(column, headers));
                }
            }
        }
        Ok(())
    }

    fn check_shape(&self) -> Result<()> {
        if self.charts.is_empty() {
            return Err(ChartError::Config("no charts defined".into()));
        }
        for (chart_type, spec) in &self.charts {
            if spec.series.is_empty() {
                return Err(ChartError::Config(format!(
                    "chart {chart_type:?} maps no columns"
                )));
            }
            let mut keys: Vec<&str> = spec.series.iter().map(|s| s.key.as_str()).collect();
            keys.sort_unstable();
            if let Some(w) = keys.windows(2).find(|w| w[0] == w[1]) {
                return Err(ChartError::Config(format!(
                    "chart {chart_type:?} uses series key {:?} twice",
                    w[0]
                )));
            }
        }
        Ok(())
    }
}
