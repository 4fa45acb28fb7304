// src/eurostat/clean.rs

use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, Float64Array, StringArray},
    compute::cast,
    datatypes::{DataType, Field, Schema},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use std::sync::Arc;

/// One table cell as seen by the cleaner.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(x) => Some(*x),
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(x: f64) -> Self {
        Cell::Number(x)
    }
}

/// Strip a Eurostat value qualifier and parse what is left.
///
/// Cells look like `"890"`, `"890 p"`, `":"` or `": p"`: the numeral (or the
/// `:` missing marker) comes first, then a space and flag letters that are
/// dropped. Text that is not numeric-like is returned unchanged, so
/// identifier columns can go through the same cleaner.
pub fn clean_field(cell: &Cell) -> Cell {
    match cell {
        Cell::Text(s) => clean_text(s).unwrap_or_else(|| cell.clone()),
        other => other.clone(),
    }
}

/// `None` when the leading token is neither `:` nor a number.
fn clean_text(s: &str) -> Option<Cell> {
    let candidate = s.split(' ').next().unwrap_or(s).trim();
    if candidate == ":" {
        return Some(Cell::Missing);
    }
    candidate.parse::<f64>().ok().map(Cell::Number)
}

/// Text form of a number inside a `Utf8` column: `13`, not `13.0`.
pub(crate) fn number_text(x: f64) -> String {
    x.to_string()
}

/// Apply [`clean_field`] to every cell of every column.
///
/// Text columns whose cells all clean to numbers or missing become
/// `Float64`. A text column with any non-numeric cell stays `Utf8`, holding
/// the cleaned numerals as text, the unparseable cells verbatim and nulls
/// for missing markers. Other numeric types are cast to `Float64`.
pub fn clean_data(batch: &RecordBatch) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(batch.num_columns());
    let mut columns = Vec::with_capacity(batch.num_columns());

    for (field, arr) in batch.schema_ref().fields().iter().zip(batch.columns()) {
        let cleaned = clean_column(arr)
            .with_context(|| format!("cleaning column {:?}", field.name()))?;
        fields.push(Field::new(field.name(), cleaned.data_type().clone(), true));
        columns.push(cleaned);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
    RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)
        .map_err(Into::into)
}

fn clean_column(arr: &ArrayRef) -> Result<ArrayRef> {
    match arr.data_type() {
        DataType::Float64 => Ok(arr.clone()),
        DataType::Utf8 => {
            let sarr = arr
                .as_any()
                .downcast_ref::<StringArray>()
                .context("Utf8 column is not a StringArray")?;
            Ok(clean_strings(sarr))
        }
        dt if dt.is_numeric() => Ok(cast(arr, &DataType::Float64)?),
        _ => Ok(arr.clone()),
    }
}

fn clean_strings(arr: &StringArray) -> ArrayRef {
    let cells: Vec<Cell> = arr
        .iter()
        .map(|v| match v {
            None => Cell::Missing,
            Some(s) => clean_text(s).unwrap_or_else(|| Cell::Text(s.to_string())),
        })
        .collect();

    if cells.iter().all(|c| !matches!(c, Cell::Text(_))) {
        let values: Float64Array = cells.iter().map(Cell::as_f64).collect();
        Arc::new(values) as ArrayRef
    } else {
        let values: StringArray = cells
            .into_iter()
            .map(|c| match c {
                Cell::Missing => None,
                Cell::Number(x) => Some(number_text(x)),
                Cell::Text(s) => Some(s),
            })
            .collect();
        Arc::new(values) as ArrayRef
    }
}
