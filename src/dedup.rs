//! Deduplication checkpoints.
//!
//! A checkpoint counts a lazy view, collapses exact duplicate rows and hands
//! back both the deduplicated view and a [`DedupStats`] record. Distinctness
//! is over every column the view currently selects, so the same rows can be
//! "unique" at one checkpoint and duplicated at the next.

use datafusion::prelude::DataFrame;
use indicatif::HumanCount;
use serde::Serialize;
use tracing::info;

use crate::error::Result;

/// Row counts observed at one checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    pub label: String,
    pub total: usize,
    pub unique: usize,
}

impl DedupStats {
    /// Rows that deduplication collapsed away.
    pub fn duplicates(&self) -> usize {
        self.total.saturating_sub(self.unique)
    }

    fn log(&self) {
        info!(
            "Number of rows in {}: {}",
            self.label,
            HumanCount(self.total as u64)
        );
        info!(
            "Number of unique rows in {}: {}",
            self.label,
            HumanCount(self.unique as u64)
        );
    }
}

/// Count `view`, deduplicate it, and return the deduplicated view with its stats.
///
/// Duplicates are never an error here; the counts are logged and returned
/// for the caller to interpret.
pub async fn report(view: DataFrame, label: &str) -> Result<(DataFrame, DedupStats)> {
    let total = view.clone().count().await?;
    let unique_view = view.distinct()?;
    let unique = unique_view.clone().count().await?;

    let stats = DedupStats {
        label: label.to_string(),
        total,
        unique,
    };
    stats.log();
    Ok((unique_view, stats))
}
