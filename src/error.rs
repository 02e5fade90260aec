use std::path::PathBuf;

use datafusion::error::DataFusionError;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Input directory not found or not a directory: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("No *.{extension} partition files in {}", path.display())]
    NoPartitions { path: PathBuf, extension: String },

    #[error("Schema mismatch in {}: {detail}", file.display())]
    SchemaMismatch { file: PathBuf, detail: String },

    #[error("Join key '{column}' missing from {side} side")]
    JoinKeyMissing { side: &'static str, column: String },

    #[error("Expected output column '{column}' is missing")]
    MissingColumn { column: String },

    #[error("DataFusion error: {0}")]
    DataFusion(#[from] DataFusionError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Input errors are the operator's to fix; everything else is a data or logic failure.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InputNotFound { .. } | Self::NoPartitions { .. })
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
