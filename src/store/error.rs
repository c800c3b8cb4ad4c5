//! Store error types.

use thiserror::Error;

/// Failure of a single gateway operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row exists for the given id.
    #[error("product {0} not found")]
    NotFound(i64),

    /// The database rejected or failed the statement.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
