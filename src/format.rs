//! Output formatting: day-precision batch dates, `NA` for nulls, fixed column order.

use arrow::datatypes::DataType;
use datafusion::functions::core::expr_fn::coalesce;
use datafusion::functions::unicode::expr_fn::left;
use datafusion::logical_expr::SortExpr;
use datafusion::prelude::*;

use crate::common::*;
use crate::error::{PipelineError, Result};

/// Check that every output column is present, by output name.
pub fn validate_output_schema(table: &DataFrame) -> Result<()> {
    let schema = table.schema();
    match output_columns().find(|name| !schema.has_column_with_unqualified_name(name)) {
        Some(missing) => Err(PipelineError::MissingColumn {
            column: missing.to_string(),
        }),
        None => Ok(()),
    }
}

/// The batch date truncated to `YYYY-MM-DD`. Shorter values pass through as-is.
fn batch_date(value: Expr) -> Expr {
    left(value, lit(BATCH_DATE_WIDTH as i64))
}

fn output_expr(name: &'static str) -> Expr {
    let value = cast(col(name), DataType::Utf8);
    let value = if name == BATCH { batch_date(value) } else { value };
    coalesce(vec![value, lit(NULL_SENTINEL)]).alias(name)
}

/// Format a renamed table for writing.
///
/// Every output column becomes text with nulls rendered as [`NULL_SENTINEL`];
/// columns outside the output schema are dropped. Rows are sorted on all
/// output columns so repeated runs write identical files.
pub fn format(table: DataFrame) -> Result<DataFrame> {
    validate_output_schema(&table)?;

    let formatted = table.select(output_columns().map(output_expr).collect::<Vec<_>>())?;
    let order: Vec<SortExpr> = output_columns().map(|name| col(name).sort(true, false)).collect();
    Ok(formatted.sort(order)?)
}
