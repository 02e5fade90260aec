//! Observation fixtures for unit tests.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use datafusion::prelude::{DataFrame, SessionContext};
use parquet::arrow::ArrowWriter;

use crate::common::*;

/// One input row. Fields not set explicitly get plausible constant values.
#[derive(Debug, Clone)]
pub struct Obs {
    pub allele: Option<&'static str>,
    pub gene: Option<&'static str>,
    pub sample: &'static str,
    pub group: &'static str,
    pub colony: &'static str,
    pub weight: Option<f64>,
    pub date: Option<&'static str>,
    pub metadata_group: Option<&'static str>,
}

pub fn obs(sample: &'static str, group: &'static str, colony: &'static str) -> Obs {
    Obs {
        allele: None,
        gene: None,
        sample,
        group,
        colony,
        weight: Some(20.5),
        date: Some("2020-05-14T10:22:00Z"),
        metadata_group: Some("d41d8cd9"),
    }
}

impl Obs {
    pub fn allele(mut self, allele: &'static str, gene: &'static str) -> Self {
        self.allele = Some(allele);
        self.gene = Some(gene);
        self
    }

    pub fn weight(mut self, weight: Option<f64>) -> Self {
        self.weight = weight;
        self
    }

    pub fn date(mut self, date: Option<&'static str>) -> Self {
        self.date = date;
        self
    }

    pub fn metadata_group(mut self, metadata_group: Option<&'static str>) -> Self {
        self.metadata_group = metadata_group;
        self
    }
}

pub fn observation_schema() -> Arc<Schema> {
    let fields: Vec<Field> = REQUESTED_COLUMNS
        .iter()
        .map(|&name| {
            let dt = if name == WEIGHT {
                DataType::Float64
            } else {
                DataType::Utf8
            };
            Field::new(name, dt, true)
        })
        .collect();
    Arc::new(Schema::new(fields))
}

fn string_column(rows: &[Obs], f: impl Fn(&Obs) -> Option<&'static str>) -> ArrayRef {
    Arc::new(rows.iter().map(f).collect::<StringArray>())
}

pub fn observation_batch(rows: &[Obs]) -> RecordBatch {
    let columns: Vec<ArrayRef> = vec![
        string_column(rows, |r| r.allele),
        string_column(rows, |r| r.gene),
        string_column(rows, |r| Some(r.sample)),
        string_column(rows, |r| Some(r.group)),
        string_column(rows, |_| Some("female")),
        string_column(rows, |_| Some("HMGU")),
        string_column(rows, |r| Some(r.colony)),
        Arc::new(rows.iter().map(|r| r.weight).collect::<Float64Array>()),
        string_column(rows, |_| Some("homozygote")),
        string_column(rows, |_| Some("C57BL/6NCrl")),
        string_column(rows, |r| r.date),
        string_column(rows, |r| r.metadata_group),
        string_column(rows, |_| Some("HMGU")),
    ];
    RecordBatch::try_new(observation_schema(), columns).unwrap()
}

/// Lazy view over in-memory rows, shaped like the unified source view.
pub fn observation_frame(ctx: &SessionContext, rows: &[Obs]) -> DataFrame {
    ctx.read_batch(observation_batch(rows)).unwrap()
}

pub fn write_parquet(path: &Path, batch: &RecordBatch) {
    let file = File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(batch).unwrap();
    writer.close().unwrap();
}

/// Collect a frame and render it as rows of optional strings, for assertions.
pub async fn collect_rows(df: DataFrame) -> Vec<Vec<Option<String>>> {
    let batches = df.collect().await.unwrap();
    let mut rows = Vec::new();
    for batch in &batches {
        let columns: Vec<ArrayRef> = batch
            .columns()
            .iter()
            .map(|c| arrow::compute::cast(c, &DataType::Utf8).unwrap())
            .collect();
        for i in 0..batch.num_rows() {
            rows.push(
                columns
                    .iter()
                    .map(|c| {
                        let s = c.as_any().downcast_ref::<StringArray>().unwrap();
                        if s.is_null(i) {
                            None
                        } else {
                            Some(s.value(i).to_string())
                        }
                    })
                    .collect(),
            );
        }
    }
    rows
}

/// Column names of a frame, unqualified, in order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.schema().fields().iter().map(|f| f.name().clone()).collect()
}
