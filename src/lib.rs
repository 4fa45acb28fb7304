//! Readers for statistical-agency bulk downloads.
//!
//! - [`eurostat`]: wide-format TSV exports with compound identifier headers and
//!   qualified cells (`"890 p"`, `": p"`), cleaned and melted to long form.
//! - [`ons`]: CSV exports whose data region is followed by a copyright banner
//!   and a fixed-stride metadata block.
//! - [`fetch`]: single best-effort download of a dataset.
//! - [`table`]: the Arrow-backed tables the readers return, plus Parquet export.
//! - [`convert`]: file-to-Parquet conversion used by the `fsic-convert` binary.

pub mod convert;
pub mod error;
pub mod eurostat;
pub mod fetch;
pub mod ons;
pub mod table;

pub use error::FormatError;
pub use table::Frame;
