//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the local stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A store file could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A row expected to exist was not found.
    #[error("row {key} not found in table `{table}`")]
    RowNotFound {
        /// The table name.
        table: String,
        /// The natural key that was looked up.
        key: i64,
    },

    /// An opaque backend failure (or an injected test failure).
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Creates an opaque backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Returns true for missing-row errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::RowNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::RowNotFound {
            table: "events".into(),
            key: 42,
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "row 42 not found in table `events`");

        assert!(!StoreError::backend("boom").is_not_found());
    }
}
