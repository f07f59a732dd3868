//! Error types for database provisioning and SQL execution.

use thiserror::Error;

/// Failures raised inside the store before they are folded into a
/// [`QueryResult::Error`](crate::sqlite::QueryResult::Error) at the operation boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced database file does not exist.
    #[error("Database '{0}' does not exist")]
    NotFound(String),

    /// The caller supplied unusable input.
    #[error("{0}")]
    InvalidInput(String),

    /// SQLite rejected the statement or the connection.
    #[error("{0}")]
    Execution(#[from] rusqlite::Error),

    /// A statement failure already rendered to text by the executor.
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        StoreError::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
