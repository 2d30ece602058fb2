//! Error types for the loader engine.
//!
//! The taxonomy distinguishes three situations:
//! - **Transient record failures** are aggregated as [`RecordFailure`]
//!   entries in the run result; one bad record never aborts a run.
//! - **Cascade integrity failures** ([`LoadError::Cascade`]) escape `run`
//!   so the caller can halt dependent processing.
//! - **Source exhaustion** is not an error at all; it is normal termination.

use crate::loader::RunResult;
use rowsync_model::{Endpoint, FieldError, RecordKey, RecordState};
use rowsync_store::StoreError;
use std::fmt;
use thiserror::Error;

/// Result type for loader runs.
pub type LoadResult<T> = Result<T, LoadError>;

/// Fatal errors a sync run can surface to its caller.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A post-save (cascade) step failed.
    ///
    /// A record persisted as inactive whose dependents were not inactivated
    /// is an inconsistent state worth stopping for, so this aborts the run.
    #[error("cascade failure for key {key} on {endpoint} ({state}): {message}")]
    Cascade {
        /// The endpoint being synced.
        endpoint: Endpoint,
        /// The record-state filter being synced.
        state: RecordState,
        /// The remote identifier of the record that triggered the cascade.
        key: RecordKey,
        /// The underlying failure.
        message: String,
        /// Summary of the records processed before the failure point.
        partial: Box<RunResult>,
    },

    /// The sync-status store failed.
    ///
    /// Without status updates a crash would not leave a resumable cursor,
    /// so this is fatal too.
    #[error("status store failure: {0}")]
    Status(#[from] StoreError),
}

impl LoadError {
    /// Creates a cascade-integrity error carrying the partial run summary.
    pub fn cascade(
        endpoint: Endpoint,
        state: RecordState,
        key: RecordKey,
        message: impl Into<String>,
        partial: RunResult,
    ) -> Self {
        Self::Cascade {
            endpoint,
            state,
            key,
            message: message.into(),
            partial: Box::new(partial),
        }
    }

    /// Returns true for cascade-integrity failures.
    pub fn is_cascade(&self) -> bool {
        matches!(self, LoadError::Cascade { .. })
    }
}

/// Errors raised by a remote source when fetching a page.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The fetch itself failed (network, remote rejection, scripted gap).
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The page payload could not be interpreted.
    #[error("malformed page: {0}")]
    Malformed(String),

    /// An I/O error while reading a local snapshot.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    /// Creates a fetch error.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    /// Creates a malformed-page error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

/// An error returned by a pre-save or post-save hook.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    /// Creates a hook error.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<StoreError> for HookError {
    fn from(err: StoreError) -> Self {
        Self(err.to_string())
    }
}

impl From<FieldError> for HookError {
    fn from(err: FieldError) -> Self {
        Self(err.to_string())
    }
}

/// The pipeline stage at which a record failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Extracting the natural key from the remote record.
    Key,
    /// Looking up the existing local row.
    Lookup,
    /// The variant's format mapping.
    Format,
    /// The pre-save hook.
    PreSave,
    /// Persisting the row.
    Persist,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureStage::Key => "key",
            FailureStage::Lookup => "lookup",
            FailureStage::Format => "format",
            FailureStage::PreSave => "pre-save",
            FailureStage::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// One transient record-level failure, aggregated into the run result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// The natural key, when it could be extracted.
    pub key: Option<RecordKey>,
    /// The stage that failed.
    pub stage: FailureStage,
    /// The underlying failure message.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_error_display() {
        let partial = RunResult::new(Endpoint::new("events"), RecordState::Deleted);
        let err = LoadError::cascade(
            Endpoint::new("events"),
            RecordState::Deleted,
            42,
            "injected delete failure",
            partial,
        );

        assert!(err.is_cascade());
        let text = err.to_string();
        assert!(text.contains("42"));
        assert!(text.contains("events"));
        assert!(text.contains("deleted"));
    }

    #[test]
    fn hook_error_from_store_error() {
        let err: HookError = StoreError::backend("boom").into();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn failure_stage_display() {
        assert_eq!(FailureStage::Format.to_string(), "format");
        assert_eq!(FailureStage::PreSave.to_string(), "pre-save");
    }
}
