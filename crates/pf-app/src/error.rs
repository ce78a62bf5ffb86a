//! Error types for the pf-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and
/// provides one error interface for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to read config file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file: {path}")]
    ConfigFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config validation failed: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extract(String),

    #[error("Derivation error: {0}")]
    Derive(String),

    #[error("Deck error: {0}")]
    Deck(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("{failed} of {attempted} simulator runs failed")]
    BatchFailed { failed: usize, attempted: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<pf_extract::ExtractError> for AppError {
    fn from(err: pf_extract::ExtractError) -> Self {
        AppError::Extract(err.to_string())
    }
}

impl From<pf_derive::DeriveError> for AppError {
    fn from(err: pf_derive::DeriveError) -> Self {
        AppError::Derive(err.to_string())
    }
}

impl From<pf_deck::DeckError> for AppError {
    fn from(err: pf_deck::DeckError) -> Self {
        AppError::Deck(err.to_string())
    }
}

impl From<pf_results::ResultsError> for AppError {
    fn from(err: pf_results::ResultsError) -> Self {
        match err {
            pf_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}
