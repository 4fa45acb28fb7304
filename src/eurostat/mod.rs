// src/eurostat/mod.rs
//
// Eurostat bulk-download TSV files: read, clean and melt to long form.

pub mod clean;
pub mod raw;
pub mod structure;

use crate::error::FormatError;
use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use serde::Deserialize;
use std::{fmt, path::Path, str::FromStr};
use tracing::debug;

pub use clean::{clean_data, clean_field, Cell};
pub use raw::read_raw;
pub use structure::structure;

/// Shape of the table returned by [`read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Form {
    /// Long form: identifiers, time axis, `value`.
    #[default]
    Structured,
    /// As laid out in the file: one column per period.
    Raw,
}

impl FromStr for Form {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "structured" => Ok(Form::Structured),
            "raw" => Ok(Form::Raw),
            other => Err(FormatError::InvalidForm(other.to_string())),
        }
    }
}

impl TryFrom<String> for Form {
    type Error = FormatError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Form::Structured => "structured",
            Form::Raw => "raw",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TsvOptions {
    /// Strip value qualifiers and convert to numbers.
    pub clean: bool,
    pub form: Form,
}

impl Default for TsvOptions {
    fn default() -> Self {
        Self {
            clean: true,
            form: Form::Structured,
        }
    }
}

/// Read `path`, optionally clean it, and return it in the requested form.
#[tracing::instrument(level = "info", skip(path, opts), fields(path = %path.as_ref().display(), form = %opts.form))]
pub fn read<P: AsRef<Path>>(path: P, opts: &TsvOptions) -> Result<RecordBatch> {
    let path = path.as_ref();
    let mut data = read_raw(path)?;
    if opts.clean {
        data = clean_data(&data).with_context(|| format!("cleaning {:?}", path))?;
    }
    let data = match opts.form {
        Form::Structured => {
            structure(&data).with_context(|| format!("structuring {:?}", path))?
        }
        Form::Raw => data,
    };
    debug!(rows = data.num_rows(), cols = data.num_columns(), "read");
    Ok(data)
}
