//! pf-results: stored pipeline outputs.
//!
//! Each stored run is a directory holding the exported table and a JSON
//! manifest describing how it was produced.

pub mod hash;
pub mod store;
pub mod types;

pub use hash::{SourceFingerprint, compute_run_id, fingerprint_file};
pub use store::ResultStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Invalid run id: {0}")]
    InvalidRunId(String),
}
