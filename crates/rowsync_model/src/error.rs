//! Error types for the data model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, FieldError>;

/// Errors raised while reading typed fields out of a remote record.
///
/// These are the per-record failures the loader treats as transient: the
/// offending record is reported and skipped, the run continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// A required field is absent from the remote record.
    #[error("missing field `{0}`")]
    Missing(String),

    /// A field is present but has an unexpected JSON type.
    #[error("field `{field}` has unexpected type, expected {expected}")]
    WrongType {
        /// The field name.
        field: String,
        /// The expected type description.
        expected: &'static str,
    },

    /// The remote payload is not a JSON object.
    #[error("remote record is not an object: {0}")]
    NotAnObject(String),
}

impl FieldError {
    /// Creates a missing-field error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing(field.into())
    }

    /// Creates a wrong-type error.
    pub fn wrong_type(field: impl Into<String>, expected: &'static str) -> Self {
        Self::WrongType {
            field: field.into(),
            expected,
        }
    }
}
