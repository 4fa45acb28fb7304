// src/ons/meta.rs

use crate::error::FormatError;
use crate::table::{batch_from_columns, Frame};
use anyhow::Result;
use arrow::array::{ArrayRef, StringArray};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Lines per series record: one heading plus four attributes.
pub const DEFAULT_STRIDE: usize = 5;

/// Row label name of the metadata table.
pub const ATTRIBUTE_INDEX: &str = "attribute";

const DESCRIPTION: &str = "description";

/// Drop the first and last character (surrounding quotes).
fn strip_outer(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

/// Drop the leading marker character.
fn strip_marker(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next();
    chars.as_str()
}

fn upsert(entry: &mut Vec<(String, String)>, key: &str, value: &str) {
    match entry.iter_mut().find(|(k, _)| k == key) {
        Some((_, v)) => *v = value.to_string(),
        None => entry.push((key.to_string(), value.to_string())),
    }
}

/// Parse an ONS metadata block into a table with one column per series code
/// and one row per attribute (`description` first, then keys in the order
/// they first appear).
///
/// Records are windows of `stride` lines:
///
/// ```text
/// ABCD,"First test series"
/// ,seasonal_adjustment='SA'
/// ,base_period='2000'
/// ```
///
/// Windows whose heading is blank are skipped; a short final window is read
/// with the lines it has. A code seen twice keeps its first column position
/// and takes the later values. Missing attributes are null.
pub fn read_meta(raw_text: &str, stride: usize) -> Result<Frame> {
    if stride == 0 {
        return Err(FormatError::InvalidStride.into());
    }
    let lines: Vec<&str> = raw_text.lines().collect();

    let mut codes: Vec<String> = Vec::new();
    let mut records: Vec<Vec<(String, String)>> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut keys: Vec<String> = vec![DESCRIPTION.to_string()];

    for (w, window) in lines.chunks(stride).enumerate() {
        let first_line = w * stride + 1;
        let heading = window[0];
        if heading.trim().is_empty() {
            continue;
        }

        let (code, desc) = heading
            .split_once(',')
            .ok_or(FormatError::MetaHeading { line: first_line })?;
        let mut entry = vec![(DESCRIPTION.to_string(), strip_outer(desc).to_string())];

        for (j, item) in window[1..].iter().enumerate() {
            let (key, value) = strip_marker(item)
                .split_once('=')
                .ok_or(FormatError::MetaAttribute {
                    line: first_line + j + 1,
                })?;
            upsert(&mut entry, key, strip_outer(value));
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }

        match positions.get(code) {
            Some(&pos) => records[pos] = entry,
            None => {
                positions.insert(code.to_string(), codes.len());
                codes.push(code.to_string());
                records.push(entry);
            }
        }
    }

    // Transpose: series codes become columns, attribute names become rows
    let columns: Vec<ArrayRef> = records
        .iter()
        .map(|entry| {
            let cells: StringArray = keys
                .iter()
                .map(|key| {
                    entry
                        .iter()
                        .find(|(k, _)| k == key)
                        .map(|(_, v)| v.as_str())
                })
                .collect();
            Arc::new(cells) as ArrayRef
        })
        .collect();

    debug!(series = codes.len(), attributes = keys.len(), "parsed metadata");
    let data = batch_from_columns(&codes, columns, keys.len())?;
    Frame::try_new(ATTRIBUTE_INDEX, StringArray::from(keys), data)
}
