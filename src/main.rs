use anyhow::{bail, Context, Result};
use confidx::{
    catalog::Catalog,
    export::write_series_parquet,
    fetch::{download_raw, Locator},
    logging,
    pipeline,
    render::{surface_for, OutputKind},
};
use reqwest::Client;
use std::{env, path::PathBuf};
use tracing::{error, info};

const USAGE: &str = "usage:
  confidx list
  confidx render <chart-type> [plotly|svg]
  confidx render-all [plotly|svg]
  confidx export <chart-type> <dest.parquet>
  confidx download <dest>

env: CONFIDX_CONFIG (catalog YAML), CONFIDX_SOURCE (path or URL), CONFIDX_OUT_DIR (default: charts)";

/// Built-in catalog unless `CONFIDX_CONFIG` names a YAML file;
/// `CONFIDX_SOURCE` then overrides the source locator.
fn load_catalog() -> Result<Catalog> {
    let mut catalog = match env::var("CONFIDX_CONFIG") {
        Ok(path) => Catalog::from_yaml_path(&path)
            .with_context(|| format!("loading chart catalog from {}", path))?,
        Err(_) => Catalog::default(),
    };
    if let Ok(source) = env::var("CONFIDX_SOURCE") {
        catalog.source.locator = source;
    }
    Ok(catalog)
}

fn output_kind(arg: Option<String>) -> Result<OutputKind> {
    match arg {
        Some(a) => Ok(a.parse()?),
        None => Ok(OutputKind::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    logging::init_stderr();

    // ─── 2) config ───────────────────────────────────────────────────
    let catalog = load_catalog()?;
    let out_dir = PathBuf::from(env::var("CONFIDX_OUT_DIR").unwrap_or_else(|_| "charts".into()));
    let client = Client::new();

    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        eprintln!("{USAGE}");
        bail!("missing command");
    };

    // ─── 3) dispatch ─────────────────────────────────────────────────
    match command.as_str() {
        "list" => {
            for chart_type in catalog.chart_types() {
                let spec = catalog.chart(chart_type)?;
                println!("{chart_type}\t{}", spec.title);
            }
        }

        "render" => {
            let chart_type = args.next().context("render needs a chart type")?;
            let kind = output_kind(args.next())?;

            let series = pipeline::load_series(&client, &catalog, &chart_type)
                .await
                .with_context(|| format!("loading series for {}", chart_type))?;
            let mut surface = surface_for(kind, &out_dir);
            let path = pipeline::render(surface.as_mut(), &catalog, &chart_type, &series)?;
            info!(chart_type = %chart_type, path = %path.display(), "rendered");
            println!("{}", path.display());
        }

        "render-all" => {
            let kind = output_kind(args.next())?;
            let mut surface = surface_for(kind, &out_dir);
            match pipeline::render_all(&client, &catalog, surface.as_mut()).await {
                Ok(paths) => {
                    for p in paths {
                        println!("{}", p.display());
                    }
                }
                Err(e) => {
                    error!("render-all failed: {}", e);
                    return Err(e.into());
                }
            }
        }

        "export" => {
            let chart_type = args.next().context("export needs a chart type")?;
            let dest = PathBuf::from(args.next().context("export needs a destination path")?);

            let series = pipeline::load_series(&client, &catalog, &chart_type).await?;
            let rows = write_series_parquet(&series, &dest)?;
            info!(rows, dest = %dest.display(), "exported");
        }

        "download" => {
            let dest = PathBuf::from(args.next().context("download needs a destination path")?);
            let locator = Locator::parse(&catalog.source.locator);
            let bytes = download_raw(&client, &locator, &dest)
                .await
                .with_context(|| format!("downloading {}", locator))?;
            info!(bytes, dest = %dest.display(), "downloaded source unchanged");
        }

        other => {
            eprintln!("{USAGE}");
            bail!("unknown command {:?}", other);
        }
    }

    Ok(())
}
