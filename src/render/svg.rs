// src/render/svg.rs
//! Static line charts drawn with plotters.

use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;
use std::path::PathBuf;
use tracing::{debug, instrument, warn};

use super::{output_path, series_color, ChartSurface};
use crate::catalog::ChartSpec;
use crate::error::{ChartError, Result};
use crate::process::{date_parser::parse_date_label, Series, SeriesSet};

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 600;

fn render_err(e: impl std::fmt::Display) -> ChartError {
    ChartError::Render(e.to_string())
}

fn day_number(d: NaiveDate) -> f64 {
    d.num_days_from_ce() as f64
}

fn day_label(x: &f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

/// `"#00356B"` → RGB. Anything else falls back to black.
fn parse_hex(color: &str) -> RGBColor {
    let hex = color.trim().trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
    };
    match (hex.len(), channel(0), channel(2), channel(4)) {
        (6, Some(r), Some(g), Some(b)) => RGBColor(r, g, b),
        _ => BLACK,
    }
}

/// Split a series into unbroken runs of `(day, value)`.
/// A missing value ends the current run; an unparseable date is skipped.
fn segments(series: &Series) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    let mut bad_dates = 0usize;

    for (t, v) in series.timestamps().iter().zip(series.values()) {
        match (parse_date_label(t), v) {
            (Some(d), Some(v)) => current.push((day_number(d), *v)),
            (_, None) => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            (None, Some(_)) => bad_dates += 1,
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    if bad_dates > 0 {
        warn!(key = series.key(), bad_dates, "skipped points with unparseable dates");
    }
    out
}

/// Grow a configured window so that every data point lies strictly inside
/// it. Sides the data does not cross are left as configured.
fn widen(configured: (f64, f64), data: (f64, f64), pad_ratio: f64, min_pad: f64) -> (f64, f64) {
    let (clo, chi) = configured;
    let (dlo, dhi) = data;
    let pad = ((chi.max(dhi) - clo.min(dlo)) * pad_ratio).max(min_pad);
    (
        if dlo < clo { dlo - pad } else { clo },
        if dhi > chi { dhi + pad } else { chi },
    )
}

fn x_bounds(spec: &ChartSpec, runs: &[Vec<(f64, f64)>]) -> (f64, f64) {
    let configured = spec.x_range.as_ref().and_then(|[lo, hi]| {
        Some((
            day_number(parse_date_label(lo)?),
            day_number(parse_date_label(hi)?),
        ))
    });
    let data = runs
        .iter()
        .flatten()
        .map(|&(x, _)| (x, x))
        .reduce(|(a, b), (c, d)| (a.min(c), b.max(d)));

    let (lo, hi) = match (configured, data) {
        (Some(c), Some(d)) => widen(c, d, 0.02, 15.0),
        (Some(c), None) => c,
        (None, Some(d)) => d,
        (None, None) => {
            let today = day_number(chrono::Utc::now().date_naive());
            return (today - 365.0, today);
        }
    };
    if hi <= lo {
        return (lo - 1.0, lo + 1.0);
    }
    (lo, hi)
}

fn y_bounds(spec: &ChartSpec, series: &SeriesSet) -> (f64, f64) {
    let data = series
        .iter()
        .filter_map(Series::value_range)
        .reduce(|(a, b), (c, d)| (a.min(c), b.max(d)));

    match (spec.y_range, data) {
        (Some([lo, hi]), Some(d)) if hi > lo => widen((lo, hi), d, 0.05, 1.0),
        (Some([lo, hi]), None) if hi > lo => (lo, hi),
        (_, None) => (0.0, 100.0),
        (_, Some((lo, hi))) => {
            let pad = ((hi - lo) * 0.15).max(1.0);
            ((lo - pad).floor(), (hi + pad).ceil())
        }
    }
}

/// Writes `<out_dir>/<chart_type>.svg`.
pub struct SvgSurface {
    out_dir: PathBuf,
    size: (u32, u32),
}

impl SvgSurface {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            size: (WIDTH, HEIGHT),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }
}

impl ChartSurface for SvgSurface {
    #[instrument(level = "info", skip(self, spec, series), fields(out_dir = %self.out_dir.display()))]
    fn render(
        &mut self,
        chart_type: &str,
        spec: &ChartSpec,
        series: &SeriesSet,
    ) -> Result<PathBuf> {
        let path = output_path(&self.out_dir, chart_type, "svg")?;
        let runs: Vec<Vec<Vec<(f64, f64)>>> = series.iter().map(segments).collect();
        let all_points: Vec<Vec<(f64, f64)>> = runs.iter().flatten().cloned().collect();
        let (x_lo, x_hi) = x_bounds(spec, &all_points);
        let (y_lo, y_hi) = y_bounds(spec, series);

        {
            let root = SVGBackend::new(&path, self.size).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(&spec.title, ("sans-serif", 24.0))
                .margin(20)
                .x_label_area_size(40)
                .y_label_area_size(50)
                .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
                .map_err(render_err)?;

            chart
                .configure_mesh()
                .x_labels(8)
                .x_label_formatter(&day_label)
                .y_desc("Confidence Index Value")
                .draw()
                .map_err(render_err)?;

            for (i, (s, series_runs)) in series.iter().zip(&runs).enumerate() {
                let color = parse_hex(&series_color(s.color(), i));
                for (j, run) in series_runs.iter().enumerate() {
                    let drawn = chart
                        .draw_series(LineSeries::new(run.iter().copied(), color.stroke_width(2)))
                        .map_err(render_err)?;
                    if j == 0 {
                        drawn.label(s.label()).legend(move |(x, y)| {
                            PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                        });
                    }
                }
            }

            if runs.iter().any(|r| !r.is_empty()) {
                chart
                    .configure_series_labels()
                    .position(SeriesLabelPosition::UpperLeft)
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()
                    .map_err(render_err)?;
            }

            root.present().map_err(render_err)?;
        }

        debug!(path = %path.display(), series = series.len(), "wrote svg chart");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::process::{build_series, parse_delimited, SeriesColumn};
    use std::fs;
    use tempfile::tempdir;

    fn spec_for(columns: &[(&str, &str)]) -> ChartSpec {
        let mut spec = Catalog::default().chart("valuation").unwrap().clone();
        spec.series = columns
            .iter()
            .map(|(k, c)| SeriesColumn::new(*k, *c).with_label(k.to_uppercase()))
            .collect();
        spec
    }

    #[test]
    fn missing_value_splits_line() {
        let table = parse_delimited(
            "Date,A\n2020-01-01,1\n2020-02-01,2\n2020-03-01,\n2020-04-01,4\nnot-a-date,5\n",
            ',',
        );
        let set = build_series(&table, &[SeriesColumn::new("a", "A")]).unwrap();
        let runs = segments(set.get("a").unwrap());
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 2);
        assert_eq!(runs[1].len(), 1);
        assert_eq!(runs[1][0].1, 4.0);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex("#00356B"), RGBColor(0, 0x35, 0x6B));
        assert_eq!(parse_hex("ff6b6b"), RGBColor(0xFF, 0x6B, 0x6B));
        assert_eq!(parse_hex("blue"), BLACK);
    }

    #[test]
    fn bounds_fall_back_to_data() {
        let table = parse_delimited("Date,A\n2020-01-01,50\n2020-03-01,70\n", ',');
        let mut spec = spec_for(&[("a", "A")]);
        spec.x_range = None;
        spec.y_range = None;
        let set = build_series(&table, &spec.series).unwrap();
        let runs = segments(set.get("a").unwrap());

        let (x_lo, x_hi) = x_bounds(&spec, &runs);
        assert_eq!(day_label(&x_lo), "2020-01");
        assert_eq!(day_label(&x_hi), "2020-03");
        assert_eq!(y_bounds(&spec, &set), (47.0, 73.0));
        assert_eq!(y_bounds(&spec, &SeriesSet::default()), (0.0, 100.0));
    }

    #[test]
    fn data_outside_configured_window_widens_bounds() {
        let table = parse_delimited(
            "Date,A\n2001-01-01,95\n2002-01-01,45\n2006-01-01,20\n2007-01-01,25\n2008-01-01,60\n",
            ',',
        );
        let spec = spec_for(&[("a", "A")]);
        let set = build_series(&table, &spec.series).unwrap();
        let runs = segments(set.get("a").unwrap());

        let (x_lo, x_hi) = x_bounds(&spec, &runs);
        let first = day_number(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap());
        assert!(x_lo < first, "{} !< 2001-01-01", day_label(&x_lo));
        assert_eq!(day_label(&x_hi), "2024-01");

        let (y_lo, y_hi) = y_bounds(&spec, &set);
        assert!(y_lo < 20.0, "{y_lo}");
        assert_eq!(y_hi, 100.0);

        // inside the window nothing moves
        let table = parse_delimited("Date,A\n2010-01-01,50\n2011-01-01,70\n", ',');
        let set = build_series(&table, &spec.series).unwrap();
        let runs = segments(set.get("a").unwrap());
        assert_eq!(y_bounds(&spec, &set), (40.0, 100.0));
        assert_eq!(day_label(&x_bounds(&spec, &runs).0), "2005-01");
    }

    /// Every `points="x,y x,y .."` attribute in the document.
    fn polylines(svg: &str) -> Vec<Vec<(f64, f64)>> {
        svg.split("points=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .map(|pts| {
                pts.split_whitespace()
                    .filter_map(|p| {
                        let (x, y) = p.split_once(',')?;
                        Some((x.parse().ok()?, y.parse().ok()?))
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn out_of_window_points_keep_their_own_position() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let table = parse_delimited(
            "Date,A\n2001-01-01,95\n2002-01-01,45\n2006-01-01,20\n2007-01-01,25\n2008-01-01,60\n",
            ',',
        );
        let spec = spec_for(&[("a", "A")]);
        let set = build_series(&table, &spec.series)?;

        let path = SvgSurface::new(dir.path()).render("valuation", &spec, &set)?;
        let svg = fs::read_to_string(&path)?;

        let lines: Vec<_> = polylines(&svg).into_iter().filter(|l| l.len() == 5).collect();
        assert_eq!(lines.len(), 1, "expected one 5-point data line");
        let line = &lines[0];
        for w in line.windows(2) {
            assert!(w[1].0 > w[0].0, "x not increasing: {line:?}");
        }
        for (i, a) in line.iter().enumerate() {
            for b in &line[i + 1..] {
                assert_ne!(a.1, b.1, "distinct values share a y pixel: {line:?}");
            }
        }
        Ok(())
    }

    #[test]
    fn writes_svg_with_title_and_legend() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let table = parse_delimited(
            "Date,A,B\n2010-01-01,61.5,70\n2010-02-01,x,71\n2010-03-01,63,\n2010-04-01,64,73\n",
            ',',
        );
        let spec = spec_for(&[("corp", "A"), ("ind", "B")]);
        let set = build_series(&table, &spec.series)?;

        let mut surface = SvgSurface::new(dir.path()).with_size(640, 400);
        let path = surface.render("valuation", &spec, &set)?;
        assert_eq!(path, dir.path().join("valuation.svg"));

        let svg = fs::read_to_string(&path)?;
        assert!(svg.starts_with("<svg") || svg.starts_with("<?xml"), "{}", &svg[..40]);
        assert!(svg.contains("U.S. Valuation Confidence Index"));
        assert!(svg.contains("CORP"));
        assert!(svg.contains("IND"));
        Ok(())
    }

    #[test]
    fn renders_when_every_point_is_missing() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let table = parse_delimited("Date,A\n2010-01-01,\n2010-02-01,n/a\n", ',');
        let spec = spec_for(&[("a", "A")]);
        let set = build_series(&table, &spec.series)?;

        let path = SvgSurface::new(dir.path()).render("valuation", &spec, &set)?;
        assert!(fs::metadata(&path)?.len() > 0);
        Ok(())
    }
}
