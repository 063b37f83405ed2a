// src/export/mod.rs

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{fs, fs::File, path::Path, sync::Arc};
use tracing::{info, instrument};

use crate::error::{ChartError, Result};
use crate::process::SeriesSet;

pub const DATE_FIELD: &str = "Date";

fn export_err(e: impl std::fmt::Display) -> ChartError {
    ChartError::Export(e.to_string())
}

/// Columnar view of a [`SeriesSet`]: a `Date` column plus one nullable
/// Float64 column per series, named by its key.
pub fn series_to_batch(series: &SeriesSet) -> Result<RecordBatch> {
    let first = series
        .iter()
        .next()
        .ok_or_else(|| ChartError::Export("no series to export".into()))?;

    let mut fields = vec![Field::new(DATE_FIELD, DataType::Utf8, false)];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(first.timestamps().to_vec()))];

    for s in series {
        if s.timestamps() != first.timestamps() {
            return Err(ChartError::Export(format!(
                "series {:?} is not aligned with {:?}",
                s.key(),
                first.key()
            )));
        }
        fields.push(Field::new(s.key(), DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(s.values().to_vec())));
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(export_err)
}

/// Write `series` as a single-row-group Parquet file at `dest`.
#[instrument(level = "info", skip(series, dest), fields(dest = %dest.as_ref().display()))]
pub fn write_series_parquet(series: &SeriesSet, dest: impl AsRef<Path>) -> Result<usize> {
    let dest = dest.as_ref();
    let batch = series_to_batch(series)?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(export_err)?;
    }
    let file = File::create(dest)
        .map_err(|e| ChartError::Export(format!("creating {}: {}", dest.display(), e)))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props)).map_err(export_err)?;
    writer.write(&batch).map_err(export_err)?;
    writer.close().map_err(export_err)?;

    info!(rows = batch.num_rows(), columns = batch.num_columns(), "exported series");
    Ok(batch.num_rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{build_series, parse_delimited, Series, SeriesColumn};
    use arrow::array::Array;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::tempdir;

    fn sample() -> SeriesSet {
        let t = parse_delimited("Date,A,B\n2020-01-01,10.5,x\n2020-02-01,,20\n", ',');
        build_series(
            &t,
            &[SeriesColumn::new("s1", "A"), SeriesColumn::new("s2", "B")],
        )
        .unwrap()
    }

    #[test]
    fn parquet_keeps_rows_and_nulls() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let dest = dir.path().join("exports").join("crash.parquet");
        let rows = write_series_parquet(&sample(), &dest)?;
        assert_eq!(rows, 2);

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&dest)?)?.build()?;
        let batches: Vec<RecordBatch> = reader.collect::<std::result::Result<_, _>>()?;
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 2);

        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["Date", "s1", "s2"]);

        let s1 = batch
            .column(1)
            .as_any()
            .downcast_ref::<Float64Array>()
            .expect("s1 is f64");
        assert_eq!(s1.value(0), 10.5);
        assert!(s1.is_null(1));

        let s2 = batch
            .column(2)
            .as_any()
            .downcast_ref::<Float64Array>()
            .expect("s2 is f64");
        assert!(s2.is_null(0));
        assert_eq!(s2.value(1), 20.0);
        Ok(())
    }

    #[test]
    fn empty_set_is_rejected() {
        let err = write_series_parquet(&SeriesSet::default(), "unused.parquet").unwrap_err();
        assert!(matches!(err, ChartError::Export(_)));
    }

    #[test]
    fn misaligned_series_are_rejected() {
        let mut a = Series::new("a", "a");
        a.push("2020-01-01", Some(1.0));
        let b = Series::new("b", "b");
        let set: SeriesSet = vec![a, b].into_iter().collect();
        assert!(matches!(series_to_batch(&set), Err(ChartError::Export(_))));
    }
}
