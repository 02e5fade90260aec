//! Run configuration.

use std::path::{Path, PathBuf};

// ============================================================================
// Configuration
// ============================================================================

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output_control";

/// File name of the table holding rows with an unknown colony.
pub const DEFAULT_UNKNOWN_FILE: &str = "control_unknown.csv";

/// File name of the control rows joined to their experimental alleles.
pub const DEFAULT_JOINED_FILE: &str = "control_data.csv";

/// Extension of the partition files picked up from the input directory.
pub const DEFAULT_PARTITION_EXTENSION: &str = "parquet";

/// Configuration for a single pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory of observation partitions
    pub input_dir: PathBuf,
    /// Directory the two output tables are written into
    pub output_dir: PathBuf,
    /// Output file name for the unknown-colony table
    pub unknown_file: String,
    /// Output file name for the joined control table
    pub joined_file: String,
    /// Partition file extension, without the dot
    pub partition_extension: String,
    /// Number of joined rows to render after writing (0 to skip)
    pub preview_rows: usize,
    /// Where to write the JSON run report, if anywhere
    pub report_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            unknown_file: DEFAULT_UNKNOWN_FILE.to_string(),
            joined_file: DEFAULT_JOINED_FILE.to_string(),
            partition_extension: DEFAULT_PARTITION_EXTENSION.to_string(),
            preview_rows: 0,
            report_path: None,
        }
    }
}

impl PipelineConfig {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            ..Self::default()
        }
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Set the number of preview rows
    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    /// Write a JSON run report to `path`
    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    pub fn unknown_path(&self) -> PathBuf {
        self.output_dir.join(&self.unknown_file)
    }

    pub fn joined_path(&self) -> PathBuf {
        self.output_dir.join(&self.joined_file)
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }
}
