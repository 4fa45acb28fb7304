// src/convert.rs

use crate::eurostat::{self, TsvOptions};
use crate::ons::{self, CsvOptions, OnsData};
use crate::table::write_parquet;
use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Options for a conversion run, one section per reader.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub tsv: TsvOptions,
    pub csv: CsvOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// `.tsv` / `.tsv.gz`
    Eurostat,
    /// `.csv`
    Ons,
}

impl InputKind {
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".tsv") || name.ends_with(".tsv.gz") {
            Some(InputKind::Eurostat)
        } else if name.ends_with(".csv") {
            Some(InputKind::Ons)
        } else {
            None
        }
    }
}

/// File name with `.gz` and then `.tsv`/`.csv` removed.
fn output_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".into());
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    name.strip_suffix(".tsv")
        .or_else(|| name.strip_suffix(".csv"))
        .unwrap_or(name)
        .to_string()
}

/// Convert one input file to Parquet under `out_dir`, returning the files
/// written: `<stem>.parquet`, plus `<stem>_meta.parquet` for ONS exports
/// read with metadata.
pub fn convert_file(path: &Path, out_dir: &Path, opts: &ConvertOptions) -> Result<Vec<PathBuf>> {
    let stem = output_stem(path);
    let mut written = Vec::new();

    match InputKind::detect(path) {
        Some(InputKind::Eurostat) => {
            let batch = eurostat::read(path, &opts.tsv)?;
            let out = out_dir.join(format!("{}.parquet", stem));
            write_parquet(&batch, &out)?;
            written.push(out);
        }
        Some(InputKind::Ons) => {
            let OnsData { data, meta } = ons::read_csv(path, &opts.csv)?;
            let out = out_dir.join(format!("{}.parquet", stem));
            write_parquet(&data.to_record_batch()?, &out)?;
            written.push(out);
            if let Some(meta) = meta {
                let out = out_dir.join(format!("{}_meta.parquet", stem));
                write_parquet(&meta.to_record_batch()?, &out)?;
                written.push(out);
            }
        }
        None => bail!("unrecognised input type: {}", path.display()),
    }

    info!(input = %path.display(), outputs = written.len(), "converted");
    Ok(written)
}
