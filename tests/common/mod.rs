//! Parquet partition fixtures shared by the integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use confluence::common::{REQUESTED_COLUMNS, WEIGHT};
use parquet::arrow::ArrowWriter;

pub const HEADER: &str = "specimen_id,group,background_strain_name,colony_id,marker_accession_id,\
allele_accession_id,batch,metadata_group,weight,sex,production_center,phenotyping_center";

/// One observation: `(sample, group, colony, allele, gene)`.
pub type Row = (
    &'static str,
    &'static str,
    &'static str,
    Option<&'static str>,
    Option<&'static str>,
);

fn strings(values: impl Iterator<Item = Option<&'static str>>) -> ArrayRef {
    Arc::new(values.collect::<StringArray>())
}

pub fn write_partition(path: &Path, rows: &[Row]) {
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
    let schema = Arc::new(Schema::new(fields));

    let columns: Vec<ArrayRef> = vec![
        strings(rows.iter().map(|r| r.3)),
        strings(rows.iter().map(|r| r.4)),
        strings(rows.iter().map(|r| Some(r.0))),
        strings(rows.iter().map(|r| Some(r.1))),
        strings(rows.iter().map(|_| Some("male"))),
        strings(rows.iter().map(|_| Some("ICS"))),
        strings(rows.iter().map(|r| Some(r.2))),
        Arc::new(rows.iter().map(|_| Some(31.5)).collect::<Float64Array>()),
        strings(rows.iter().map(|_| Some("homozygote"))),
        strings(rows.iter().map(|_| Some("C57BL/6NTac"))),
        strings(rows.iter().map(|_| Some("2020-05-14T10:22:00Z"))),
        strings(rows.iter().map(|_| None)),
        strings(rows.iter().map(|_| Some("ICS"))),
    ];
    let batch = RecordBatch::try_new(schema, columns).unwrap();

    let file = File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

/// The expected output line for a row written by [`write_partition`].
pub fn expected_line(row: &Row) -> String {
    let (sample, group, colony, allele, gene) = *row;
    format!(
        "{sample},{group},C57BL/6NTac,{colony},{},{},2020-05-14,NA,31.5,male,ICS,ICS",
        gene.unwrap_or("NA"),
        allele.unwrap_or("NA"),
    )
}

pub fn data_lines(text: &str) -> Vec<&str> {
    text.lines().skip(1).collect()
}
