// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};
use url::Url;

/// ONS dataset download endpoint; a bare dataset code is appended to it.
pub const ONS_DATASET_URL: &str =
    "http://www.ons.gov.uk/ons/datasets-and-tables/downloads/csv.csv?dataset=";

/// Text encodings a download can be decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Encoding {
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
}

impl Encoding {
    /// Decode `bytes`, handing them back untouched if they are not valid in
    /// this encoding.
    pub fn decode(self, bytes: Vec<u8>) -> Result<String, Vec<u8>> {
        match self {
            // every byte maps to the code point of the same value
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Encoding::Utf8 => String::from_utf8(bytes).map_err(|e| e.into_bytes()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Write the download here instead of returning it.
    pub save_to: Option<PathBuf>,
    /// Decode the body; `None` keeps raw bytes.
    pub decode_to: Option<Encoding>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            save_to: None,
            decode_to: Some(Encoding::Latin1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    Bytes(Vec<u8>),
    Text(String),
    /// Written to disk at this path.
    Saved(PathBuf),
}

/// Anything containing a `/` is taken as a URL, anything else as an ONS
/// dataset code (e.g. `qna`, `ukea`).
pub fn dataset_url(url_or_code: &str) -> Result<Url> {
    let raw = if url_or_code.contains('/') {
        url_or_code.to_string()
    } else {
        format!("{}{}", ONS_DATASET_URL, url_or_code)
    };
    Url::parse(&raw).with_context(|| format!("parsing URL {}", raw))
}

/// Download a dataset once with a fresh client. See [`fetch_with`].
pub fn fetch(url_or_code: &str, opts: &FetchOptions) -> Result<Fetched> {
    fetch_with(&Client::new(), url_or_code, opts)
}

/// Download a dataset once, optionally decode it, optionally save it.
///
/// There is no retry: transport errors and non-success statuses are
/// returned as they are. A body that does not decode is kept as bytes.
#[tracing::instrument(level = "info", skip(client, opts))]
pub fn fetch_with(client: &Client, url_or_code: &str, opts: &FetchOptions) -> Result<Fetched> {
    let url = dataset_url(url_or_code)?;
    let bytes = client
        .get(url.clone())
        .send()
        .with_context(|| format!("GET {}", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .bytes()
        .with_context(|| format!("reading body from {}", url))?
        .to_vec();
    debug!(%url, bytes = bytes.len(), "downloaded");

    let fetched = match opts.decode_to {
        Some(enc) => match enc.decode(bytes) {
            Ok(text) => Fetched::Text(text),
            Err(bytes) => {
                warn!(%url, encoding = ?enc, "body did not decode; keeping bytes");
                Fetched::Bytes(bytes)
            }
        },
        None => Fetched::Bytes(bytes),
    };

    match &opts.save_to {
        None => Ok(fetched),
        Some(path) => {
            save(&fetched, path)?;
            Ok(Fetched::Saved(path.clone()))
        }
    }
}

fn save(fetched: &Fetched, path: &Path) -> Result<()> {
    let contents: &[u8] = match fetched {
        Fetched::Text(text) => text.as_bytes(),
        Fetched::Bytes(bytes) => bytes.as_slice(),
        Fetched::Saved(_) => return Ok(()),
    };
    fs::write(path, contents).with_context(|| format!("writing {:?}", path))
}
