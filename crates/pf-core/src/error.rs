use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Unknown column: {name}")]
    UnknownColumn { name: String },

    #[error("Record width mismatch for {source_name}: expected {expected}, got {actual}")]
    WidthMismatch {
        source_name: String,
        expected: usize,
        actual: usize,
    },
}
