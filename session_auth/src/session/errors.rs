use thiserror::Error;

use crate::storage::StorageError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(String),

    /// A freshly derived session id already exists in the store.
    #[error("Session identifier collision: {0}")]
    IdentifierCollision(String),

    /// The configured lifetime pushes an expiry past the representable time range.
    #[error("Session expiry out of range: {0}")]
    ExpiryOutOfRange(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
