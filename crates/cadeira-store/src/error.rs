//! Error types for the cadeira store.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while executing or decoding a statement.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to database: {0}")]
    Connect(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("query exceeded deadline of {0:?}")]
    Timeout(Duration),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("unsupported column type {type_name} for column {column}")]
    UnsupportedColumn { column: String, type_name: String },

    #[error("statement not understood by executor: {0}")]
    UnexpectedStatement(String),
}
