//! Partitioning and join engine.
//!
//! The unified view is split on the colony id:
//!
//! ```text
//!                    unified view
//!            colony_id = "unknown" │ colony_id ≠ "unknown"
//!               ┌──────────────────┴───────────────────┐
//!          unknown table                  control ──┐     experimental
//!        (rename, dedup)            (drop alleles,  │   (allele, gene, colony,
//!                                      dedup)       │        dedup)
//!                                                   └─ LEFT JOIN on colony_id ─┘
//!                                                              │
//!                                                        joined table
//! ```
//!
//! Rows with a known colony whose group is neither `control` nor
//! `experimental` appear in neither output.
//!
//! The join is a plain left outer join: a control row whose colony appears
//! `k` times on the experimental side yields `max(k, 1)` output rows. That
//! fan-out is reported, never corrected.

use datafusion::common::{Column, JoinType};
use datafusion::prelude::*;
use indicatif::HumanCount;
use serde::Serialize;
use tracing::{info, warn};

use crate::common::*;
use crate::dedup::{self, DedupStats};
use crate::error::{PipelineError, Result};

const CONTROL_ALIAS: &str = "control";
const EXPERIMENTAL_ALIAS: &str = "experimental";

// ============================================================================
// Split
// ============================================================================

/// Split `view` into rows with an unknown colony and rows with a known one.
pub fn split_by_colony(view: DataFrame) -> Result<(DataFrame, DataFrame)> {
    let unknown = view
        .clone()
        .filter(col(COLONY_ID).eq(lit(UNKNOWN_COLONY)))?;
    let known = view.filter(col(COLONY_ID).not_eq(lit(UNKNOWN_COLONY)))?;
    Ok((unknown, known))
}

/// Rename input columns to their output names. Columns outside the output
/// schema keep their names; the formatter drops them later.
pub fn rename_to_output(df: DataFrame) -> Result<DataFrame> {
    let mut df = df;
    for field in output_renames() {
        df = df.with_column_renamed(field.source, field.output)?;
    }
    Ok(df)
}

/// Control rows of the known side, without the allele columns.
pub fn control_subset(known: DataFrame) -> Result<DataFrame> {
    let control = known.filter(col(BIOLOGICAL_SAMPLE_GROUP).eq(lit(CONTROL_GROUP)))?;
    Ok(control.drop_columns(&ALLELE_COLUMNS[..])?)
}

/// `(allele, gene, colony)` triples of the experimental rows on the known side.
pub fn experimental_subset(known: DataFrame) -> Result<DataFrame> {
    let experimental = known.filter(col(BIOLOGICAL_SAMPLE_GROUP).eq(lit(EXPERIMENTAL_GROUP)))?;
    Ok(experimental.select_columns(&[ALLELE_ACCESSION_ID, GENE_ACCESSION_ID, COLONY_ID])?)
}

// ============================================================================
// Join
// ============================================================================

fn require_column(df: &DataFrame, side: &'static str, column: &str) -> Result<()> {
    if df.schema().has_column_with_unqualified_name(column) {
        Ok(())
    } else {
        Err(PipelineError::JoinKeyMissing {
            side,
            column: column.to_string(),
        })
    }
}

fn unqualified_names(df: &DataFrame) -> Vec<String> {
    df.schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect()
}

/// Left outer join of `control` with `experimental` on the colony id.
///
/// The result keeps every control column in order, followed by the
/// experimental columns other than the key. Unmatched control rows get nulls
/// for the experimental columns.
pub fn left_join(control: DataFrame, experimental: DataFrame) -> Result<DataFrame> {
    require_column(&control, CONTROL_ALIAS, COLONY_ID)?;
    require_column(&experimental, EXPERIMENTAL_ALIAS, COLONY_ID)?;

    let control_columns = unqualified_names(&control);
    let experimental_columns: Vec<String> = unqualified_names(&experimental)
        .into_iter()
        .filter(|name| name != COLONY_ID)
        .collect();

    // Both sides come from the same scan, so they share a qualifier until
    // aliased apart.
    let joined = control.alias(CONTROL_ALIAS)?.join(
        experimental.alias(EXPERIMENTAL_ALIAS)?,
        JoinType::Left,
        &[COLONY_ID],
        &[COLONY_ID],
        None,
    )?;

    let projection: Vec<Expr> = control_columns
        .iter()
        .map(|name| (CONTROL_ALIAS, name))
        .chain(experimental_columns.iter().map(|name| (EXPERIMENTAL_ALIAS, name)))
        .map(|(side, name)| col(Column::new(Some(side), name)).alias(name))
        .collect();
    Ok(joined.select(projection)?)
}

// ============================================================================
// Tables
// ============================================================================

/// The unknown-colony table, renamed and deduplicated.
pub async fn build_unknown(unknown: DataFrame) -> Result<(DataFrame, DedupStats)> {
    dedup::report(rename_to_output(unknown)?, "with unknown colony_id").await
}

/// The joined control table plus the checkpoint stats gathered on the way.
pub struct JoinedTable {
    /// Renamed join result; not deduplicated.
    pub table: DataFrame,
    pub control: DedupStats,
    pub experimental: DedupStats,
    pub joined: DedupStats,
}

impl JoinedTable {
    /// Output rows added by control rows matching more than one experimental row.
    pub fn fanout_rows(&self) -> usize {
        self.joined.total.saturating_sub(self.control.unique)
    }
}

pub async fn build_joined(known: DataFrame) -> Result<JoinedTable> {
    let (control, control_stats) =
        dedup::report(control_subset(known.clone())?, "in control group").await?;
    let (experimental, experimental_stats) =
        dedup::report(experimental_subset(known)?, "in experimental group").await?;

    let table = rename_to_output(left_join(control, experimental)?)?;
    let (_, joined_stats) = dedup::report(table.clone(), "in joined dataframe").await?;

    let joined = JoinedTable {
        table,
        control: control_stats,
        experimental: experimental_stats,
        joined: joined_stats,
    };
    let fanout = joined.fanout_rows();
    if fanout > 0 {
        warn!(
            "Join fan-out added {} rows: some colonies match several experimental alleles",
            HumanCount(fanout as u64)
        );
    }
    Ok(joined)
}

// ============================================================================
// Diagnostics
// ============================================================================

/// How many distinct alleles map onto how many colonies.
///
/// When `allele_rows` exceeds `distinct_colonies`, at least one colony carries
/// several alleles and the join will fan out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlleleCardinality {
    /// Distinct `(allele, gene, colony)` triples with a non-null allele.
    pub allele_rows: usize,
    /// Distinct colony ids among those triples.
    pub distinct_colonies: usize,
}

impl AlleleCardinality {
    pub fn is_one_to_one(&self) -> bool {
        self.allele_rows == self.distinct_colonies
    }
}

pub async fn allele_cardinality(view: DataFrame) -> Result<AlleleCardinality> {
    let triples = view
        .filter(col(ALLELE_ACCESSION_ID).is_not_null())?
        .select_columns(&[ALLELE_ACCESSION_ID, GENE_ACCESSION_ID, COLONY_ID])?
        .distinct()?;
    let allele_rows = triples.clone().count().await?;
    let distinct_colonies = triples
        .select_columns(&[COLONY_ID])?
        .distinct()?
        .count()
        .await?;

    info!("Number of unique allele rows: {}", HumanCount(allele_rows as u64));
    info!(
        "Number of unique colony_id values: {}",
        HumanCount(distinct_colonies as u64)
    );
    Ok(AlleleCardinality {
        allele_rows,
        distinct_colonies,
    })
}
