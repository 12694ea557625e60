//! Error taxonomy for the persistence layer.

use std::path::PathBuf;

use rusqlite::{Error as SqlError, ErrorCode};
use thiserror::Error;

/// Errors surfaced by the storage handle, schema manager and repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file could not be created or opened. Fatal at startup.
    #[error("storage unavailable at {}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A foreign-key, CHECK or NOT NULL constraint rejected the write.
    #[error("cannot save {entity}: a store constraint was violated")]
    ConstraintViolation {
        entity: &'static str,
        #[source]
        source: SqlError,
    },

    /// An update targeted an id that has no row.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A previous holder of the connection panicked mid-operation.
    #[error("storage connection poisoned")]
    Poisoned,

    #[error("database error: {0}")]
    Database(#[from] SqlError),
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;

/// Sort SQLite failures into constraint violations and everything else.
pub(crate) fn map_constraint(err: SqlError, entity: &'static str) -> StoreError {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    ) {
        StoreError::ConstraintViolation {
            entity,
            source: err,
        }
    } else {
        StoreError::Database(err)
    }
}
