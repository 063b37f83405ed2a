// src/pipeline.rs
//! Two explicit stages: `load*` fetches and builds series, `render*` hands
//! them to a [`ChartSurface`]. Either side can be exercised on its own.

use reqwest::Client;
use std::path::PathBuf;
use tracing::{info, instrument};

use crate::catalog::{Catalog, SourceConfig};
use crate::error::Result;
use crate::fetch::{fetch_text, Locator};
use crate::process::{build_series, decode, RawTable, SeriesSet};
use crate::render::ChartSurface;

/// Fetch and parse the configured source into a fresh [`RawTable`].
#[instrument(level = "info", skip(client, source), fields(locator = %source.locator))]
pub async fn load(client: &Client, source: &SourceConfig) -> Result<RawTable> {
    let locator = Locator::parse(&source.locator);
    let text = fetch_text(client, &locator).await?;
    let format = source.format.resolve(locator.file_name().as_deref(), &text);
    let table = decode(&text, format, source.delimiter, &source.date_column)?;
    info!(?format, columns = table.headers.len(), rows = table.rows.len(), "loaded table");
    Ok(table)
}

/// Series for one chart type out of an already loaded table.
pub fn series_for(catalog: &Catalog, chart_type: &str, table: &RawTable) -> Result<SeriesSet> {
    let spec = catalog.chart(chart_type)?;
    build_series(table, &spec.series)
}

/// Load stage for a single chart type.
///
/// An unknown chart type is reported before anything is fetched.
pub async fn load_series(client: &Client, catalog: &Catalog, chart_type: &str) -> Result<SeriesSet> {
    catalog.chart(chart_type)?;
    let table = load(client, &catalog.source).await?;
    series_for(catalog, chart_type, &table)
}

/// Render stage for a single chart type.
pub fn render(
    surface: &mut dyn ChartSurface,
    catalog: &Catalog,
    chart_type: &str,
    series: &SeriesSet,
) -> Result<PathBuf> {
    let spec = catalog.chart(chart_type)?;
    surface.render(chart_type, spec, series)
}

/// Load the source once, check every configured column against its header,
/// then render every chart type.
#[instrument(level = "info", skip_all)]
pub async fn render_all(
    client: &Client,
    catalog: &Catalog,
    surface: &mut dyn ChartSurface,
) -> Result<Vec<PathBuf>> {
    let table = load(client, &catalog.source).await?;
    catalog.validate_columns(&table.headers)?;

    let mut written = Vec::with_capacity(catalog.charts.len());
    for (chart_type, spec) in &catalog.charts {
        let series = build_series(&table, &spec.series)?;
        written.push(surface.render(chart_type, spec, &series)?);
    }
    info!(charts = written.len(), "rendered all charts");
    Ok(written)
}
