// src/eurostat/raw.rs

use crate::error::FormatError;
use crate::table::{batch_from_columns, typed_column};
use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use flate2::read::MultiGzDecoder;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};
use tracing::debug;

/// Field separator: a comma or a tab, swallowing any spaces before it.
static FIELD_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r" *[,\t]").expect("valid separator"));

/// Raw cells treated as missing on read. `": "` only survives splitting as
/// the last field of a line.
fn is_missing(field: &str) -> bool {
    matches!(field, "" | ":" | ": ")
}

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    FIELD_SEP.split(line).map(|f| f.trim_start_matches(' '))
}

/// Read a Eurostat bulk-download TSV (gzip-compressed when the path ends in
/// `.gz`) into a batch with one column per header field.
///
/// Columns whose present cells are all numeric come back as `Float64`;
/// anything else (identifiers, qualified values such as `"13 p"`) stays `Utf8`.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_raw<P: AsRef<Path>>(path: P) -> Result<RecordBatch> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {:?}", path))?;

    let gz = path.extension().map_or(false, |ext| ext == "gz");
    let batch = if gz {
        parse_raw(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        parse_raw(BufReader::new(file))
    }
    .with_context(|| format!("reading {:?}", path))?;

    debug!(
        rows = batch.num_rows(),
        cols = batch.num_columns(),
        compressed = gz,
        "read raw table"
    );
    Ok(batch)
}

/// Parse TSV text from any reader. Blank lines are skipped; rows shorter than
/// the header are padded with missing cells.
pub fn parse_raw<R: BufRead>(reader: R) -> Result<RecordBatch> {
    let mut lines = reader.lines().enumerate();

    // 1) Header: first non-blank line
    let mut headers: Vec<String> = Vec::new();
    for (_, line) in lines.by_ref() {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);
        if !line.trim().is_empty() {
            headers = split_fields(line).map(str::to_string).collect();
            break;
        }
    }

    // 2) Body, column-major
    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    let mut num_rows = 0;
    for (idx, line) in lines {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        let mut fields: Vec<&str> = split_fields(line).collect();
        // empty surplus fields come from a trailing delimiter
        if fields.len() > headers.len()
            && fields[headers.len()..].iter().all(|f| f.trim().is_empty())
        {
            fields.truncate(headers.len());
        }
        if fields.len() > headers.len() {
            return Err(FormatError::RaggedRow {
                line: idx + 1,
                expected: headers.len(),
                found: fields.len(),
            }
            .into());
        }
        for (i, col) in columns.iter_mut().enumerate() {
            let cell = fields
                .get(i)
                .filter(|f| !is_missing(f))
                .map(|f| f.to_string());
            col.push(cell);
        }
        num_rows += 1;
    }

    let arrays = columns.into_iter().map(typed_column).collect();
    batch_from_columns(&headers, arrays, num_rows)
}
