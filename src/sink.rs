//! Materialization and table sinks.
//!
//! [`materialize`] is the only place a formatted view is evaluated for
//! output: one `collect()` per table, handed to a [`TableSink`] and kept in
//! the returned [`Materialized`] for the preview.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use arrow::csv::WriterBuilder;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use datafusion::prelude::DataFrame;
use indicatif::HumanCount;
use tracing::info;

use crate::error::Result;

/// Serializes a materialized table to a file.
pub trait TableSink {
    /// Write `batches` to `path` in order, replacing any existing file.
    /// Returns the number of data rows written.
    fn write_table(&self, schema: &SchemaRef, batches: &[RecordBatch], path: &Path) -> Result<usize>;
}

/// Comma-separated output with a header row.
#[derive(Debug, Clone)]
pub struct CsvSink {
    delimiter: u8,
}

impl Default for CsvSink {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvSink {
    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl TableSink for CsvSink {
    fn write_table(&self, schema: &SchemaRef, batches: &[RecordBatch], path: &Path) -> Result<usize> {
        let file = BufWriter::new(File::create(path)?);
        let mut writer = WriterBuilder::new()
            .with_header(true)
            .with_delimiter(self.delimiter)
            .build(file);

        // the header is emitted on the first write, so an empty table still gets one
        if batches.is_empty() {
            writer.write(&RecordBatch::new_empty(schema.clone()))?;
        }
        let mut rows = 0;
        for batch in batches {
            writer.write(batch)?;
            rows += batch.num_rows();
        }
        writer.into_inner().flush()?;
        Ok(rows)
    }
}

/// A table evaluated for output, held so later consumers reuse the batches
/// instead of evaluating the view again.
#[derive(Debug, Clone)]
pub struct Materialized {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
    pub rows: usize,
}

impl Materialized {
    /// The first `n` rows as zero-copy slices of the collected batches.
    pub fn head(&self, n: usize) -> Vec<RecordBatch> {
        let mut remaining = n;
        let mut out = Vec::new();
        for batch in &self.batches {
            if remaining == 0 {
                break;
            }
            let take = remaining.min(batch.num_rows());
            out.push(batch.slice(0, take));
            remaining -= take;
        }
        out
    }
}

/// Evaluate `table` once and write it through `sink`.
pub async fn materialize(table: DataFrame, sink: &dyn TableSink, path: &Path) -> Result<Materialized> {
    let schema: SchemaRef = table.schema().inner().clone();
    let batches = table.collect().await?;
    let rows = sink.write_table(&schema, &batches, path)?;
    info!("  Wrote {} rows to {}", HumanCount(rows as u64), path.display());
    Ok(Materialized {
        schema,
        batches,
        rows,
    })
}
