//! Confidence-index charts: load a CSV (or JSON records) source, build
//! date-aligned series per chart type and render them.

pub mod catalog;
pub mod error;
pub mod export;
pub mod fetch;
pub mod logging;
pub mod pipeline;
pub mod process;
pub mod render;

pub use catalog::{Catalog, ChartSpec, SourceConfig};
pub use error::ChartError;
pub use process::{build_series, RawTable, Series, SeriesColumn, SeriesSet};
