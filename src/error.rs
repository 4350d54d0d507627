//! Error kinds surfaced by the selection core.

use thiserror::Error;

/// Failure to obtain the bytes of a tabular source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source not found: {0}")]
    NotFound(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("source {0} is empty")]
    Empty(String),

    #[error("malformed table in {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// A single field that could not be interpreted.
///
/// These are always recovered where they occur; callers pick the default.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("value is missing")]
    Missing,

    #[error("not a finite number: {0:?}")]
    NotNumeric(String),

    #[error("malformed range: {0:?}")]
    MalformedRange(String),

    #[error("unknown rating: {0:?}")]
    UnknownRating(String),
}

/// Fatal failures of a selection run.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error(transparent)]
    SourceUnavailable(#[from] SourceError),

    #[error("malformed catalog: {0}")]
    MalformedCatalog(#[from] csv::Error),

    #[error("no drone data available")]
    EmptyCatalog,
}
