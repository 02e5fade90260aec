//! End-to-end run: scan, split, join, format, write.
//!
//! The two outputs are independent lazy graphs over the same unified view.
//! Each is evaluated exactly once for writing, after formatting, and the
//! preview is cut from those same batches. Everything evaluated before that
//! is a row count for the diagnostics.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use arrow::util::pretty::pretty_format_batches;
use datafusion::prelude::{DataFrame, SessionContext};
use indicatif::{HumanCount, HumanDuration};
use serde::Serialize;
use tracing::info;

use crate::config::PipelineConfig;
use crate::dedup::DedupStats;
use crate::error::Result;
use crate::format::format;
use crate::partition::{self, AlleleCardinality};
use crate::sink::{Materialized, TableSink, materialize};
use crate::source;

/// Formatted, not yet evaluated, output tables.
pub struct OutputTables {
    pub unknown: DataFrame,
    pub joined: DataFrame,
}

/// Everything observed while building the output tables.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub total_rows: usize,
    pub alleles: AlleleCardinality,
    /// Dedup checkpoints in the order they ran.
    pub checkpoints: Vec<DedupStats>,
    pub fanout_rows: usize,
}

impl Diagnostics {
    pub fn checkpoint(&self, label: &str) -> Option<&DedupStats> {
        self.checkpoints.iter().find(|c| c.label == label)
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub input_dir: PathBuf,
    pub unknown_path: PathBuf,
    pub joined_path: PathBuf,
    pub unknown_rows: usize,
    pub joined_rows: usize,
    pub diagnostics: Diagnostics,
    /// Rendered head of the joined table, when a preview was requested.
    #[serde(skip)]
    pub preview: Option<String>,
}

/// Build both formatted output tables from the unified view.
pub async fn build_outputs(view: DataFrame) -> Result<(OutputTables, Diagnostics)> {
    let total_rows = view.clone().count().await?;
    info!("Total number of rows: {}", HumanCount(total_rows as u64));

    let alleles = partition::allele_cardinality(view.clone()).await?;

    let (unknown, known) = partition::split_by_colony(view)?;
    let (unknown, unknown_stats) = partition::build_unknown(unknown).await?;
    let joined = partition::build_joined(known).await?;
    let fanout_rows = joined.fanout_rows();

    let outputs = OutputTables {
        unknown: format(unknown)?,
        joined: format(joined.table)?,
    };
    let diagnostics = Diagnostics {
        total_rows,
        alleles,
        checkpoints: vec![
            unknown_stats,
            joined.control,
            joined.experimental,
            joined.joined,
        ],
        fanout_rows,
    };
    Ok((outputs, diagnostics))
}

/// Render the output schema and the first `rows` rows of an already
/// materialized table.
pub fn preview(table: &Materialized, rows: usize) -> Result<String> {
    let columns: Vec<String> = table
        .schema
        .fields()
        .iter()
        .map(|f| format!("{}: {}", f.name(), f.data_type()))
        .collect();
    Ok(format!(
        "Schema: [{}]\n{}",
        columns.join(", "),
        pretty_format_batches(&table.head(rows))?
    ))
}

pub async fn run(
    ctx: &SessionContext,
    config: &PipelineConfig,
    sink: &dyn TableSink,
) -> Result<PipelineReport> {
    let pipeline_start = Instant::now();
    info!("Input:  {}", config.input_dir().display());
    info!("Output: {}", config.output_dir.display());

    // ── Step 1: Open partitions ────────────────────────────────────────
    info!("Step 1: Scanning partitions...");
    let view =
        source::scan_directory(ctx, config.input_dir(), &config.partition_extension).await?;

    // ── Step 2: Split, join and format ─────────────────────────────────
    info!("Step 2: Building output tables...");
    let (outputs, diagnostics) = build_outputs(view).await?;

    // ── Step 3: Write ──────────────────────────────────────────────────
    info!("Step 3: Writing output tables...");
    fs::create_dir_all(&config.output_dir)?;
    let unknown_path = config.unknown_path();
    let joined_path = config.joined_path();
    let unknown_rows = materialize(outputs.unknown, sink, &unknown_path).await?.rows;
    let joined = materialize(outputs.joined, sink, &joined_path).await?;

    let preview_text = match config.preview_rows {
        0 => None,
        rows => Some(preview(&joined, rows)?),
    };

    let report = PipelineReport {
        input_dir: config.input_dir.clone(),
        unknown_path,
        joined_path,
        unknown_rows,
        joined_rows: joined.rows,
        diagnostics,
        preview: preview_text,
    };

    if let Some(path) = &config.report_path {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        info!("  Wrote run report to {}", path.display());
    }

    info!("Done in {}", HumanDuration(pipeline_start.elapsed()));
    Ok(report)
}
