// src/table/infer.rs

use anyhow::Result;
use arrow::{
    array::{Array, ArrayRef, Float64Builder, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use std::sync::Arc;

/// Infer Arrow dtype from a single present cell.
pub fn infer_arrow_dtype_from_str(s: &str) -> DataType {
    if s.trim().parse::<f64>().is_ok() {
        DataType::Float64
    } else {
        DataType::Utf8
    }
}

/// Build one column from text cells (`None` = missing).
///
/// The column is `Float64` when every present cell parses as a number
/// (including a column with no present cells at all), otherwise `Utf8` with
/// the cells kept verbatim.
pub fn typed_column(cells: Vec<Option<String>>) -> ArrayRef {
    let numeric = cells
        .iter()
        .flatten()
        .all(|s| infer_arrow_dtype_from_str(s) == DataType::Float64);

    if numeric {
        let mut b = Float64Builder::with_capacity(cells.len());
        for cell in &cells {
            b.append_option(cell.as_deref().and_then(|s| s.trim().parse().ok()));
        }
        Arc::new(b.finish()) as ArrayRef
    } else {
        Arc::new(StringArray::from(cells)) as ArrayRef
    }
}

/// Assemble a batch from named columns. `num_rows` is needed so that a batch
/// with zero columns still knows its height.
pub fn batch_from_columns(
    names: &[String],
    columns: Vec<ArrayRef>,
    num_rows: usize,
) -> Result<RecordBatch> {
    let fields: Vec<Field> = names
        .iter()
        .zip(&columns)
        .map(|(name, col)| Field::new(name, col.data_type().clone(), true))
        .collect();
    let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
    RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)
        .map_err(Into::into)
}
