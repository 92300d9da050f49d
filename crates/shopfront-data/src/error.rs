//! Backend error types.

use thiserror::Error;

use crate::backend::Table;

/// Errors returned by a [`crate::Backend`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// No row with that identity.
    #[error("{table} row not found: {id}")]
    NotFound { table: Table, id: String },

    /// The backend rejected or failed the request.
    #[error("Request failed on {table}: {reason}")]
    RequestFailed { table: Table, reason: String },

    /// Snapshot could not be read or written.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Shared state is unusable after a panic in another task.
    #[error("Backend state poisoned")]
    Poisoned,
}

impl DataError {
    pub fn not_found(table: Table, id: impl ToString) -> Self {
        DataError::NotFound {
            table,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::NotFound { .. })
    }
}

impl From<serde_json::Error> for DataError {
    fn from(e: serde_json::Error) -> Self {
        DataError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for DataError {
    fn from(e: std::io::Error) -> Self {
        DataError::Snapshot(e.to_string())
    }
}

/// Result alias for backend calls.
pub type DataResult<T> = Result<T, DataError>;
