//! Store trait and error types.
//!
//! `ForecastStore` abstracts over the SQLite store used in production and the
//! in-memory store used by tests.

use crate::record::StoredRecord;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot be opened or is busy/locked.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the write (constraint, read-only, full disk).
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// A stored document cannot be read back.
    #[error("Corrupt document: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "The forecast database is unavailable. Try again shortly.",
            Self::Rejected(_) => "The forecast database refused the write.",
            Self::Corrupt(_) => "The forecast database contains an unreadable record.",
        }
    }

    /// Busy or locked stores may accept the write later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No document had this timestamp; one was created.
    Inserted,
    /// The document for this timestamp was overwritten in place.
    Updated,
}

/// Trait for forecast document stores.
///
/// Each call is atomic on its own; there is no batch transaction. Concurrent
/// writers to the same timestamp resolve as last-writer-wins.
pub trait ForecastStore: Send {
    /// Insert the record, or overwrite every non-key field of the document
    /// with the same timestamp.
    fn upsert(&self, record: &StoredRecord) -> StoreResult<UpsertOutcome>;

    /// Document for the given Unix-seconds timestamp, if any.
    fn get(&self, timestamp: i64) -> StoreResult<Option<StoredRecord>>;

    /// All documents ordered by ascending timestamp.
    fn list(&self) -> StoreResult<Vec<StoredRecord>>;

    fn count(&self) -> StoreResult<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(StoreError::unavailable("locked").is_retryable());
        assert!(!StoreError::rejected("readonly").is_retryable());
        assert!(!StoreError::Corrupt("bad date".into()).is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            StoreError::unavailable("database is locked").to_string(),
            "Store unavailable: database is locked"
        );
    }
}
