use anyhow::{Context, Result};
use confidx::{catalog::Catalog, logging, pipeline, ChartError};
use reqwest::Client;
use std::{env, process::ExitCode};
use tracing::{error, info};

/// usage: confidx-check [<source path or URL>]
///
/// Loads the source once and checks every configured column against its
/// header, so a drifted header fails here instead of rendering empty charts.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    logging::init_stderr();

    let mut catalog = match env::var("CONFIDX_CONFIG") {
        Ok(path) => Catalog::from_yaml_path(&path)
            .with_context(|| format!("loading chart catalog from {}", path))?,
        Err(_) => Catalog::default(),
    };
    if let Some(source) = env::args().nth(1) {
        catalog.source.locator = source;
    }
    info!(locator = %catalog.source.locator, "checking source");

    let table = pipeline::load(&Client::new(), &catalog.source).await?;
    info!(columns = table.headers.len(), rows = table.rows.len(), "loaded");

    match catalog.validate_columns(&table.headers) {
        Ok(()) => {
            let columns: usize = catalog.charts.values().map(|c| c.series.len()).sum();
            println!(
                "ok: {} chart types, {} columns, {} rows",
                catalog.charts.len(),
                columns,
                table.rows.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(ChartError::ColumnNotFound { column, available }) => {
            error!(column = %column, "configured column missing from header");
            println!("missing column: {column:?}");
            println!("header:");
            for (i, h) in available.iter().enumerate() {
                println!("  {i:>2}  {h:?}");
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
