use thiserror::Error;

/// Input-format failures raised by the readers.
///
/// These travel inside `anyhow::Error`; callers that need to branch on the
/// kind use `err.downcast_ref::<FormatError>()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error(
        "expected exactly one column name containing '\\' to mark the final identifier column, \
         found {found}: identifier boundary is ambiguous or missing"
    )]
    IdentifierBoundary { found: usize },

    #[error("compound column name {name:?} does not split into <identifier>\\<time axis>")]
    CompoundName { name: String },

    #[error("unrecognised `form` argument: {0:?} (expected \"structured\" or \"raw\")")]
    InvalidForm(String),

    #[error("metadata stride must be at least 1")]
    InvalidStride,

    #[error("index column {index} out of range for {width} columns")]
    IndexColumn { index: usize, width: usize },

    #[error("line {line}: expected at most {expected} fields, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("metadata line {line}: heading has no ',' separating code and description")]
    MetaHeading { line: usize },

    #[error("metadata line {line}: attribute has no '=' separating key and value")]
    MetaAttribute { line: usize },
}
