//! Error types for clipstash.

use clipstash_types::Timestamp;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipstashError {
    #[error("Item not found: {0}")]
    NotFound(Timestamp),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Clipboard access failed: {0}")]
    ClipboardAccess(String),

    #[error("Invalid content: {0}")]
    InvalidContent(String),
}

/// Coarse classification reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    StorageFailure,
    ClipboardAccessFailure,
    InvalidInput,
}

impl ClipstashError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClipstashError::NotFound(_) => ErrorKind::NotFound,
            ClipstashError::DatabaseError(_) | ClipstashError::IoError(_) => {
                ErrorKind::StorageFailure
            }
            ClipstashError::ClipboardAccess(_) => ErrorKind::ClipboardAccessFailure,
            ClipstashError::InvalidContent(_) => ErrorKind::InvalidInput,
        }
    }
}
