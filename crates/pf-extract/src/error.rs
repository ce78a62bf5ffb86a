//! Extraction errors.

use pf_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors that stop extraction of a file or a batch.
///
/// Content problems inside a readable file are never errors; they become
/// missing values.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to read output file: {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to list output directory: {path}")]
    ListDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid parser layout '{name}': {what}")]
    InvalidLayout { name: String, what: String },

    #[error("Unknown parser layout preset: {0}")]
    UnknownPreset(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}
