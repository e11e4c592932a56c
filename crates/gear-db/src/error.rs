//! Database error types for gear-db.

use gear_core::enums::ConflictKind;
use gear_core::errors::CoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., disallowed status change).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Input rejected before touching the database.
    #[error("{0}")]
    Validation(String),

    /// A UNIQUE constraint would be violated.
    #[error("Duplicate {field}: '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Another lesson already holds the resource for an overlapping window.
    #[error("{}", kind.message())]
    Conflict { kind: ConflictKind, lesson_id: String },

    /// A business rule refused the change.
    #[error("{0}")]
    Policy(String),

    /// The caller is not allowed to use this operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Document store I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<CoreError> for DatabaseError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::NotFound { .. } => Self::NoResult,
            CoreError::InvalidTransition { .. } => Self::InvalidState(err.to_string()),
            CoreError::Other(e) => Self::Other(e),
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(err.into())
    }
}

/// Map a libSQL UNIQUE failure to `Duplicate`, passing other errors through.
pub(crate) fn map_unique(err: libsql::Error, field: &str, value: &str) -> DatabaseError {
    if err.to_string().contains("UNIQUE constraint failed") {
        DatabaseError::Duplicate {
            field: field.to_string(),
            value: value.to_string(),
        }
    } else {
        DatabaseError::LibSql(err)
    }
}
