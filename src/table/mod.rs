// src/table/mod.rs

pub mod infer;
pub mod write;

use anyhow::{ensure, Result};
use arrow::{
    array::{Array, ArrayRef, Float64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;

pub use infer::{batch_from_columns, typed_column};
pub use write::write_parquet;

/// A table with a labelled row index.
///
/// Plain datasets are bare `RecordBatch`es; a `Frame` is used where the
/// source file gives each row an identity (ONS periods, metadata attribute
/// names).
#[derive(Debug, Clone)]
pub struct Frame {
    index_name: String,
    index: StringArray,
    data: RecordBatch,
}

impl Frame {
    pub fn try_new(
        index_name: impl Into<String>,
        index: StringArray,
        data: RecordBatch,
    ) -> Result<Self> {
        ensure!(
            index.len() == data.num_rows(),
            "index has {} labels but data has {} rows",
            index.len(),
            data.num_rows()
        );
        Ok(Self {
            index_name: index_name.into(),
            index,
            data,
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn index(&self) -> &StringArray {
        &self.index
    }

    pub fn data(&self) -> &RecordBatch {
        &self.data
    }

    pub fn height(&self) -> usize {
        self.index.len()
    }

    pub fn width(&self) -> usize {
        self.data.num_columns()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.data
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.data.column_by_name(name)
    }

    /// Position of the first row labelled `label`.
    pub fn row_position(&self, label: &str) -> Option<usize> {
        self.index.iter().position(|v| v == Some(label))
    }

    /// Text cell at (`column`, row labelled `row`); `None` if absent, null or not Utf8.
    pub fn str_value(&self, column: &str, row: &str) -> Option<&str> {
        let pos = self.row_position(row)?;
        let arr = self.column(column)?.as_any().downcast_ref::<StringArray>()?;
        arr.is_valid(pos).then(|| arr.value(pos))
    }

    /// Numeric cell at (`column`, row labelled `row`); `None` if absent, null or not Float64.
    pub fn f64_value(&self, column: &str, row: &str) -> Option<f64> {
        let pos = self.row_position(row)?;
        let arr = self.column(column)?.as_any().downcast_ref::<Float64Array>()?;
        arr.is_valid(pos).then(|| arr.value(pos))
    }

    /// Flatten into a plain batch with the index as the first column.
    /// An unnamed index is exported as `index`.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let name = if self.index_name.is_empty() {
            "index"
        } else {
            self.index_name.as_str()
        };
        let mut fields = vec![Field::new(name, DataType::Utf8, true)];
        fields.extend(self.data.schema_ref().fields().iter().map(|f| f.as_ref().clone()));

        let mut columns: Vec<ArrayRef> = vec![Arc::new(self.index.clone())];
        columns.extend(self.data.columns().iter().cloned());

        RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(Into::into)
    }
}
