//! Tabular source adapter.
//!
//! Turns a directory of parquet partitions into one lazy DataFusion view,
//! projected to [`REQUESTED_COLUMNS`]. Nothing is scanned here beyond each
//! file's parquet footer: the partitions are validated against one another
//! and then logically concatenated (`UNION ALL`), never copied.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use arrow::datatypes::{DataType, SchemaRef};
use datafusion::prelude::{DataFrame, ParquetReadOptions, SessionContext};
use indicatif::{HumanCount, ProgressBar, ProgressStyle};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::{debug, info};
use url::Url;

use crate::common::REQUESTED_COLUMNS;
use crate::error::{PipelineError, Result};

/// List partition files with the given extension directly inside `dir`,
/// sorted by path so the union order is stable between runs.
pub fn discover_partitions(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PipelineError::InputNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(PipelineError::NoPartitions {
            path: dir.to_path_buf(),
            extension: extension.to_string(),
        });
    }
    Ok(files)
}

/// Read only the parquet footer of `path` and return the requested columns'
/// types, in [`REQUESTED_COLUMNS`] order.
fn requested_types(path: &Path) -> Result<Vec<DataType>> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
    let schema: &SchemaRef = builder.schema();

    REQUESTED_COLUMNS
        .iter()
        .map(|&name| {
            schema
                .field_with_name(name)
                .map(|f| f.data_type().clone())
                .map_err(|_| PipelineError::SchemaMismatch {
                    file: path.to_path_buf(),
                    detail: format!("missing column '{name}'"),
                })
        })
        .collect()
}

/// Check that every partition carries every requested column, with the same
/// type as the first partition.
pub fn validate_partitions(files: &[PathBuf]) -> Result<()> {
    let Some((first, rest)) = files.split_first() else {
        return Ok(());
    };
    let expected = requested_types(first)?;

    for file in rest {
        let actual = requested_types(file)?;
        for ((name, want), got) in REQUESTED_COLUMNS.iter().zip(&expected).zip(&actual) {
            if want != got {
                return Err(PipelineError::SchemaMismatch {
                    file: file.clone(),
                    detail: format!(
                        "column '{name}' is {got}, expected {want} (as in {})",
                        first.display()
                    ),
                });
            }
        }
    }
    Ok(())
}

/// `file://` URL of a partition. Plain path strings are glob-parsed by the
/// listing layer; a URL is taken literally.
fn partition_url(path: &Path) -> Result<Url> {
    let absolute = fs::canonicalize(path)?;
    Url::from_file_path(&absolute).map_err(|()| PipelineError::InputNotFound { path: absolute })
}

/// Open a single partition as a lazy view restricted to the requested columns.
async fn open_partition(ctx: &SessionContext, path: &Path, extension: &str) -> Result<DataFrame> {
    let url = partition_url(path)?;
    let suffix = format!(".{extension}");
    let df = ctx
        .read_parquet(
            url.as_str(),
            ParquetReadOptions::default().file_extension(&suffix),
        )
        .await?;
    Ok(df.select_columns(&REQUESTED_COLUMNS)?)
}

/// Discover, validate and concatenate every partition in `dir` into one lazy view.
pub async fn scan_directory(
    ctx: &SessionContext,
    dir: &Path,
    extension: &str,
) -> Result<DataFrame> {
    let files = discover_partitions(dir, extension)?;
    info!(
        "  Found {} partition files in {}",
        HumanCount(files.len() as u64),
        dir.display()
    );

    validate_partitions(&files)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "  Opening    {bar:40.cyan/blue} {pos}/{len} partitions [{elapsed_precise}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-"),
    );

    let mut unified: Option<DataFrame> = None;
    for file in &files {
        debug!("  Opening {}", file.display());
        let df = open_partition(ctx, file, extension).await?;
        unified = Some(match unified {
            Some(acc) => acc.union(df)?,
            None => df,
        });
        pb.inc(1);
    }
    pb.finish_and_clear();

    unified.ok_or_else(|| PipelineError::NoPartitions {
        path: dir.to_path_buf(),
        extension: extension.to_string(),
    })
}
