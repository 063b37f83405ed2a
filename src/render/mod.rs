// src/render/mod.rs
pub mod plotly;
pub mod svg;

pub use plotly::PlotlySurface;
pub use svg::SvgSurface;

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::catalog::ChartSpec;
use crate::error::{ChartError, Result};
use crate::process::SeriesSet;

/// Line colours for series that do not configure one.
pub const PALETTE: [&str; 6] = [
    "#00356B", // Yale blue
    "#FF6B6B", // Coral
    "#2ECC71", // Green
    "#9B59B6", // Purple
    "#F39C12", // Orange
    "#1ABC9C", // Teal
];

/// Something that turns a built [`SeriesSet`] into a chart.
///
/// Rendering the same chart type again fully replaces the previous output.
pub trait ChartSurface {
    fn render(&mut self, chart_type: &str, spec: &ChartSpec, series: &SeriesSet)
        -> Result<PathBuf>;
}

/// Which surface the CLI writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputKind {
    #[default]
    Plotly,
    Svg,
}

impl FromStr for OutputKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "plotly" | "json" => Ok(OutputKind::Plotly),
            "svg" => Ok(OutputKind::Svg),
            other => Err(ChartError::Render(format!(
                "unknown output kind {other:?} (expected plotly or svg)"
            ))),
        }
    }
}

pub fn surface_for(kind: OutputKind, out_dir: impl Into<PathBuf>) -> Box<dyn ChartSurface> {
    match kind {
        OutputKind::Plotly => Box::new(PlotlySurface::new(out_dir)),
        OutputKind::Svg => Box::new(SvgSurface::new(out_dir)),
    }
}

pub(crate) fn series_color(configured: Option<&str>, idx: usize) -> String {
    configured
        .map(str::to_string)
        .unwrap_or_else(|| PALETTE[idx % PALETTE.len()].to_string())
}

/// `<out_dir>/<chart_type>.<ext>`, creating `out_dir` if needed.
pub(crate) fn output_path(out_dir: &Path, chart_type: &str, ext: &str) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .map_err(|e| ChartError::Render(format!("creating {}: {}", out_dir.display(), e)))?;
    Ok(out_dir.join(format!("{chart_type}.{ext}")))
}
