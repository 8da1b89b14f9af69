//! Error types for feed store operations

use std::path::PathBuf;
use thiserror::Error;

/// Store layer errors.
///
/// Every failing operation is fully rolled back before one of these is
/// reported, so the durable slot is always either the pre-operation state or
/// the post-operation state. Errors are cloneable so they can travel through
/// completion channels.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The expected schema could not be located at open time. Fatal: the
    /// store is unusable and is not constructed. Never retried internally.
    #[error("feed schema `{schema}` not found in store at {}", path.display())]
    SchemaNotFound { schema: String, path: PathBuf },

    /// The durable bytes for the snapshot cannot be decoded. Reported from
    /// retrieval rather than silently treating the slot as empty.
    #[error("cached feed data is corrupt: {reason}")]
    CorruptData { reason: String },

    /// A lower-level backend or codec I/O failure. Callers may retry; the
    /// store performs no automatic retry.
    #[error("store I/O failure: {reason}")]
    Io { reason: String },
}

impl StoreError {
    /// Shorthand for a corrupt-data error.
    pub fn corrupt(reason: impl Into<String>) -> Self {
        StoreError::CorruptData {
            reason: reason.into(),
        }
    }

    /// Shorthand for an I/O error.
    pub fn io(reason: impl Into<String>) -> Self {
        StoreError::Io {
            reason: reason.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
