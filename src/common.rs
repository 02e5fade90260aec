//! Column vocabulary shared by every stage of the pipeline.
//!
//! Input columns are named the way the observation partitions name them.
//! Output columns are declared once, as an ordered list of
//! `(source, output)` pairs, and every later stage checks itself against that
//! list instead of relying on ad-hoc string keys.

// ============================================================================
// Input columns
// ============================================================================

pub const ALLELE_ACCESSION_ID: &str = "allele_accession_id";
pub const GENE_ACCESSION_ID: &str = "gene_accession_id";
pub const EXTERNAL_SAMPLE_ID: &str = "external_sample_id";
pub const BIOLOGICAL_SAMPLE_GROUP: &str = "biological_sample_group";
pub const SEX: &str = "sex";
pub const PRODUCTION_CENTER: &str = "production_center";
pub const COLONY_ID: &str = "colony_id";
pub const WEIGHT: &str = "weight";
pub const ZYGOSITY: &str = "zygosity";
pub const STRAIN_NAME: &str = "strain_name";
pub const DATE_OF_EXPERIMENT: &str = "date_of_experiment";
pub const METADATA_GROUP: &str = "metadata_group";
pub const PHENOTYPING_CENTER: &str = "phenotyping_center";

/// The fixed projection applied to every partition file.
pub const REQUESTED_COLUMNS: [&str; 13] = [
    ALLELE_ACCESSION_ID,
    GENE_ACCESSION_ID,
    EXTERNAL_SAMPLE_ID,
    BIOLOGICAL_SAMPLE_GROUP,
    SEX,
    PRODUCTION_CENTER,
    COLONY_ID,
    WEIGHT,
    ZYGOSITY,
    STRAIN_NAME,
    DATE_OF_EXPERIMENT,
    METADATA_GROUP,
    PHENOTYPING_CENTER,
];

/// Columns that only carry meaning on experimental rows; dropped from the
/// control side before the join re-introduces them.
pub const ALLELE_COLUMNS: [&str; 2] = [ALLELE_ACCESSION_ID, GENE_ACCESSION_ID];

// ============================================================================
// Sentinels
// ============================================================================

/// Colony id meaning "no colony assigned". A real category, not a null.
pub const UNKNOWN_COLONY: &str = "unknown";

pub const CONTROL_GROUP: &str = "control";
pub const EXPERIMENTAL_GROUP: &str = "experimental";

/// Rendered in place of every null output cell.
pub const NULL_SENTINEL: &str = "NA";

/// Number of leading characters of the batch field kept (`YYYY-MM-DD`).
pub const BATCH_DATE_WIDTH: usize = 10;

// ============================================================================
// Output schema
// ============================================================================

pub const SPECIMEN_ID: &str = "specimen_id";
pub const GROUP: &str = "group";
pub const BACKGROUND_STRAIN_NAME: &str = "background_strain_name";
pub const MARKER_ACCESSION_ID: &str = "marker_accession_id";
pub const BATCH: &str = "batch";

/// One output column and the input column it is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputField {
    pub source: &'static str,
    pub output: &'static str,
}

impl OutputField {
    const fn new(source: &'static str, output: &'static str) -> Self {
        Self { source, output }
    }

    /// True when the field changes name between input and output.
    pub fn is_rename(&self) -> bool {
        self.source != self.output
    }
}

/// Output columns in the order they are written.
pub const OUTPUT_SCHEMA: [OutputField; 12] = [
    OutputField::new(EXTERNAL_SAMPLE_ID, SPECIMEN_ID),
    OutputField::new(BIOLOGICAL_SAMPLE_GROUP, GROUP),
    OutputField::new(STRAIN_NAME, BACKGROUND_STRAIN_NAME),
    OutputField::new(COLONY_ID, COLONY_ID),
    OutputField::new(GENE_ACCESSION_ID, MARKER_ACCESSION_ID),
    OutputField::new(ALLELE_ACCESSION_ID, ALLELE_ACCESSION_ID),
    OutputField::new(DATE_OF_EXPERIMENT, BATCH),
    OutputField::new(METADATA_GROUP, METADATA_GROUP),
    OutputField::new(WEIGHT, WEIGHT),
    OutputField::new(SEX, SEX),
    OutputField::new(PRODUCTION_CENTER, PRODUCTION_CENTER),
    OutputField::new(PHENOTYPING_CENTER, PHENOTYPING_CENTER),
];

/// Output column names, in write order.
pub fn output_columns() -> impl Iterator<Item = &'static str> {
    OUTPUT_SCHEMA.iter().map(|f| f.output)
}

/// The `(source, output)` pairs that rename a column.
pub fn output_renames() -> impl Iterator<Item = &'static OutputField> {
    OUTPUT_SCHEMA.iter().filter(|f| f.is_rename())
}
