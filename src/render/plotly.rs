// src/render/plotly.rs
//! Plotly figure documents.
//!
//! The written JSON holds `data`, `layout` and `config` ready for
//! `Plotly.newPlot(el, fig.data, fig.layout, fig.config)`.

use serde::Serialize;
use std::{fs, path::PathBuf};
use tracing::{debug, instrument};

use super::{output_path, series_color, ChartSurface};
use crate::catalog::ChartSpec;
use crate::error::{ChartError, Result};
use crate::process::{date_parser::month_year, Series, SeriesSet};

#[derive(Debug, Serialize)]
pub struct Figure {
    pub chart_type: String,
    pub question: String,
    pub data: Vec<Trace>,
    pub layout: Layout,
    pub config: Config,
}

#[derive(Debug, Serialize)]
pub struct Trace {
    pub x: Vec<String>,
    /// `null` where the source cell was missing; Plotly leaves a gap.
    pub y: Vec<Option<f64>>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub name: String,
    pub line: Line,
    pub hoverinfo: &'static str,
    pub text: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Line {
    pub color: String,
    pub width: u32,
}

#[derive(Debug, Serialize)]
pub struct Layout {
    pub title: Title,
    pub height: u32,
    pub xaxis: XAxis,
    pub yaxis: YAxis,
    pub showlegend: bool,
    pub legend: Legend,
}

#[derive(Debug, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct XAxis {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[String; 2]>,
    pub rangeslider: RangeSlider,
    pub showgrid: bool,
}

#[derive(Debug, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
    pub thickness: f64,
}

#[derive(Debug, Serialize)]
pub struct YAxis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    pub showgrid: bool,
    pub zeroline: bool,
}

#[derive(Debug, Serialize)]
pub struct Legend {
    pub x: f64,
    pub y: f64,
    pub orientation: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub display_mode_bar: bool,
    pub displaylogo: bool,
    pub responsive: bool,
}

/// `"Jan 2020<br>Corporate: 71.3"`, or `N/A` for a missing point.
fn hover_text(series: &Series) -> Vec<String> {
    series
        .timestamps()
        .iter()
        .zip(series.values())
        .map(|(t, v)| {
            let value = v.map_or_else(|| "N/A".to_string(), |v| format!("{v:.1}"));
            format!("{}<br>{}: {}", month_year(t), series.label(), value)
        })
        .collect()
}

pub fn build_figure(chart_type: &str, spec: &ChartSpec, series: &SeriesSet) -> Figure {
    let data = series
        .iter()
        .enumerate()
        .map(|(i, s)| Trace {
            x: s.timestamps().to_vec(),
            y: s.values().to_vec(),
            kind: "scatter",
            mode: "lines",
            name: s.label().to_string(),
            line: Line {
                color: series_color(s.color(), i),
                width: 2,
            },
            hoverinfo: "text",
            text: hover_text(s),
        })
        .collect();

    Figure {
        chart_type: chart_type.to_string(),
        question: spec.question.clone(),
        data,
        layout: Layout {
            title: Title {
                text: spec.title.clone(),
            },
            height: 600,
            xaxis: XAxis {
                kind: "date",
                range: spec.x_range.clone(),
                rangeslider: RangeSlider {
                    visible: true,
                    thickness: 0.03,
                },
                showgrid: true,
            },
            yaxis: YAxis {
                range: spec.y_range,
                showgrid: true,
                zeroline: false,
            },
            showlegend: true,
            legend: Legend {
                x: 0.0,
                y: 1.1,
                orientation: "h",
            },
        },
        config: Config {
            display_mode_bar: true,
            displaylogo: false,
            responsive: true,
        },
    }
}

/// Writes `<out_dir>/<chart_type>.json`.
pub struct PlotlySurface {
    out_dir: PathBuf,
}

impl PlotlySurface {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

impl ChartSurface for PlotlySurface {
    #[instrument(level = "info", skip(self, spec, series), fields(out_dir = %self.out_dir.display()))]
    fn render(
        &mut self,
        chart_type: &str,
        spec: &ChartSpec,
        series: &SeriesSet,
    ) -> Result<PathBuf> {
        let figure = build_figure(chart_type, spec, series);
        let path = output_path(&self.out_dir, chart_type, "json")?;
        let json =
            serde_json::to_vec_pretty(&figure).map_err(|e| ChartError::Render(e.to_string()))?;
        fs::write(&path, json)
            .map_err(|e| ChartError::Render(format!("writing {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), traces = figure.data.len(), "wrote plotly figure");
        Ok(path)
    }
}
