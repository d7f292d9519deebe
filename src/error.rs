//! Error types for the splitter.
//!
//! Numerical ill-definedness (NaN or infinite objectives) is not an error:
//! it flows through the computation as values. Only malformed input or
//! configuration is reported here.

use thiserror::Error;

/// Root error type for configuration, dataset and summary failures.
#[derive(Error, Debug)]
pub enum IoiError {
    /// Invalid splitter configuration (empty covariates, zero leaf size, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A configured column is not present in the dataset.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// A column name was registered twice while building a dataset.
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    /// A column does not have one value per row.
    #[error("length mismatch for {column}: expected {expected} rows, found {found}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A flat summary cannot be routed (no single root, dangling cycle).
    #[error("malformed summary: {0}")]
    MalformedSummary(String),

    /// A configuration document could not be parsed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type IoiResult<T> = Result<T, IoiError>;
