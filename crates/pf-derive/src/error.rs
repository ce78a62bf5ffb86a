//! Derivation errors.

use thiserror::Error;

/// Result type for derivation.
pub type DeriveResult<T> = Result<T, DeriveError>;

/// Preconditions that make the whole table underivable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeriveError {
    /// No run with zero added water to anchor the vent rescaling.
    #[error("No dry run (external water fraction 0) in dataset")]
    MissingDryBaseline,

    #[error("Dry baseline run {source_name} has no usable mixture density")]
    InvalidDryBaseline { source_name: String },

    #[error("Invalid derivation option: {what}")]
    InvalidOption { what: &'static str },
}
