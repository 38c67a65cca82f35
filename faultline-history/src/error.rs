//! History store error types

use thiserror::Error;

/// History result type
pub type HistoryResult<T> = Result<T, HistoryError>;

/// History store errors
#[derive(Error, Debug)]
pub enum HistoryError {
    /// IO error reading or writing a history document
    #[error("History I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("History document error: {0}")]
    Serialization(#[from] serde_json::Error),
}
