//! Deck and runner errors.

use std::path::PathBuf;
use thiserror::Error;

pub type DeckResult<T> = Result<T, DeckError>;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Failed to create directory: {path}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write input deck: {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
