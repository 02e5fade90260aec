//! Builds the control data tables from a directory of observation partitions.
//!
//! ## Input
//!
//! A directory of `*.parquet` observation partitions sharing one schema.
//!
//! ## Output
//!
//! Written to `--output-dir` (default `output_control/`):
//! - `control_unknown.csv` — rows whose colony is `unknown`
//! - `control_data.csv`    — control rows joined to the alleles of their colony
//!
//! ## Usage
//!
//! ```sh
//! cargo run --release --bin generate_control_data -- observations_parquet
//! cargo run --release --bin generate_control_data -- observations_parquet --preview 3 --report run.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use confluence::common::OUTPUT_SCHEMA;
use confluence::config::DEFAULT_OUTPUT_DIR;
use confluence::pipeline::{self, PipelineReport};
use confluence::sink::CsvSink;
use confluence::{PipelineConfig, PipelineError};
use datafusion::prelude::SessionContext;
use indicatif::HumanCount;
use tracing::error;

#[derive(Parser, Debug)]
#[command(about = "Split observation partitions into control data tables")]
struct Args {
    /// Directory of observation parquet partitions.
    input_dir: PathBuf,

    /// Directory the output tables are written into (created if absent).
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Number of joined rows to print after writing (0 to skip).
    #[arg(long, default_value_t = 0)]
    preview: usize,

    /// Write a JSON run report to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

fn print_summary(report: &PipelineReport) {
    let d = &report.diagnostics;
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║  Input: {}", report.input_dir.display());
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  Input rows:        {:>12}", HumanCount(d.total_rows as u64));
    println!(
        "║  Allele rows:       {:>12}  over {} colonies",
        HumanCount(d.alleles.allele_rows as u64),
        HumanCount(d.alleles.distinct_colonies as u64)
    );
    for stats in &d.checkpoints {
        println!(
            "║  {:<28} {:>12} rows, {:>12} unique",
            stats.label,
            HumanCount(stats.total as u64),
            HumanCount(stats.unique as u64)
        );
    }
    println!("║  Fan-out rows:      {:>12}", HumanCount(d.fanout_rows as u64));
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!(
        "║  {} ({} rows)",
        report.unknown_path.display(),
        HumanCount(report.unknown_rows as u64)
    );
    println!(
        "║  {} ({} rows)",
        report.joined_path.display(),
        HumanCount(report.joined_rows as u64)
    );
    println!("║  Columns: {}", OUTPUT_SCHEMA.len());
    println!("╚══════════════════════════════════════════════════════════════╝");
}

fn run(args: Args) -> Result<PipelineReport, PipelineError> {
    let mut config = PipelineConfig::new(args.input_dir)
        .with_output_dir(args.output_dir)
        .with_preview_rows(args.preview);
    if let Some(path) = args.report {
        config = config.with_report_path(path);
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(async {
        let ctx = SessionContext::new();
        pipeline::run(&ctx, &config, &CsvSink::default()).await
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(report) => {
            print_summary(&report);
            if let Some(preview) = &report.preview {
                println!("{preview}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if e.is_input_error() {
                eprintln!("Error: {e}");
            } else {
                error!("Pipeline failed: {e}");
            }
            ExitCode::from(1)
        }
    }
}
