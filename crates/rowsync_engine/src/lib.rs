//! Incremental sync engine pulling remote records into local tables.
//!
//! This crate provides the generic [`DataLoader`] orchestrator plus the
//! collaborators a run needs: a [`RemoteSource`] to pull pages from, a
//! [`SyncStatusTracker`] for resumable cursors, and a [`ProgressSink`]
//! for human-readable run output. Endpoint-specific behavior lives in
//! [`LoaderVariant`] values built from plain function references; the
//! built-in catalog variants are under [`variants`].
//!
//! ## Key Invariants
//!
//! - Runs are sequential per (endpoint, state) pair; records are processed
//!   in fetch order, one at a time.
//! - Re-running over the same remote data is a no-op: saves are idempotent
//!   upserts keyed by natural key.
//! - Per-record failures are isolated and aggregated; cascade-integrity
//!   failures abort the run.
//! - The cursor is checkpointed after every page, so a crashed, failed, or
//!   cancelled run can resume without reprocessing everything.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod progress;
mod snapshot;
mod source;
mod tracker;
pub mod variants;

pub use config::LoaderConfig;
pub use error::{
    FailureStage, HookError, LoadError, LoadResult, RecordFailure, SourceError,
};
pub use loader::{DataLoader, FormatFn, HookContext, HookFn, KeyFn, LoaderVariant, RunResult};
pub use progress::{ConsoleProgress, MemoryProgress, NullProgress, ProgressSink, RecordAction};
pub use snapshot::SnapshotSource;
pub use source::{Page, RemoteSource};
pub use tracker::SyncStatusTracker;
