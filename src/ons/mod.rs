// src/ons/mod.rs
//
// ONS CSV exports: a data region, a blank line, a copyright banner and a
// fixed-stride metadata block describing each series.

pub mod meta;
pub mod split;

use crate::error::FormatError;
use crate::table::{batch_from_columns, typed_column, Frame};
use anyhow::{Context, Result};
use arrow::array::StringArray;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::{
    fs::File,
    io::{BufReader, Cursor},
    path::Path,
};
use tracing::debug;

pub use meta::{read_meta, DEFAULT_STRIDE};
pub use split::{split_sections, Sections};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Column holding the row labels (periods).
    pub index_col: usize,
    /// Also parse the metadata block.
    pub return_meta: bool,
    /// Lines per metadata record.
    pub stride: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            index_col: 0,
            return_meta: false,
            stride: DEFAULT_STRIDE,
        }
    }
}

/// Result of [`read_csv`]: the series data, plus their metadata when asked for.
#[derive(Debug, Clone)]
pub struct OnsData {
    pub data: Frame,
    pub meta: Option<Frame>,
}

/// Read an ONS CSV export.
///
/// The data region is everything before the first blank line, wherever it
/// falls, so exports with any number of series and periods are handled.
#[tracing::instrument(level = "info", skip(path, opts), fields(path = %path.as_ref().display()))]
pub fn read_csv<P: AsRef<Path>>(path: P, opts: &CsvOptions) -> Result<OnsData> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
    let sections =
        split_sections(BufReader::new(file)).with_context(|| format!("reading {:?}", path))?;

    let data = parse_data(&sections.data, opts.index_col)
        .with_context(|| format!("parsing data region of {:?}", path))?;
    debug!(
        rows = data.height(),
        series = data.width(),
        meta_bytes = sections.meta.len(),
        "read data region"
    );

    let meta = if opts.return_meta {
        Some(
            read_meta(&sections.meta, opts.stride)
                .with_context(|| format!("parsing metadata of {:?}", path))?,
        )
    } else {
        None
    };
    Ok(OnsData { data, meta })
}

/// Parse the data region (header row included) with `index_col` as row labels.
pub fn parse_data(text: &str, index_col: usize) -> Result<Frame> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(text.as_bytes()));

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if index_col >= headers.len() {
        return Err(FormatError::IndexColumn {
            index: index_col,
            width: headers.len(),
        }
        .into());
    }

    let mut labels: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len() - 1];
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        let mut data_cols = columns.iter_mut();
        for (i, field) in record.iter().enumerate() {
            if i == index_col {
                labels.push(field.to_string());
            } else if let Some(col) = data_cols.next() {
                col.push(Some(field).filter(|f| !f.trim().is_empty()).map(str::to_string));
            }
        }
    }

    let num_rows = labels.len();
    let mut names = headers;
    let index_name = names.remove(index_col);
    let arrays = columns.into_iter().map(typed_column).collect();
    let data = batch_from_columns(&names, arrays, num_rows)?;
    Frame::try_new(index_name, StringArray::from(labels), data)
}
