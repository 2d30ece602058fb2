//! Sync-status store trait definition.

use crate::error::StoreResult;
use rowsync_model::{Endpoint, RecordState, SyncStatus};

/// Persistent store for per-(endpoint, state) sync status.
///
/// One entry exists per pair. Updates must be applied atomically per key;
/// last writer wins. Only one run per pair should be live at a time -
/// concurrent runs on the same pair are a caller error and are not guarded
/// here.
///
/// # Implementors
///
/// - [`super::MemoryStatusStore`] - for testing
/// - [`super::FileStatusStore`] - JSON-file-backed, for the CLI
pub trait StatusStore: Send + Sync {
    /// Reads the entry for a pair, if it has ever run.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn get(&self, endpoint: &Endpoint, state: RecordState) -> StoreResult<Option<SyncStatus>>;

    /// Creates or replaces the entry for `status`'s pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be persisted.
    fn put(&self, status: SyncStatus) -> StoreResult<()>;

    /// Returns all entries, ordered by (endpoint, state).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn all(&self) -> StoreResult<Vec<SyncStatus>>;

    /// Removes the entry for a pair (explicit reset).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn remove(&self, endpoint: &Endpoint, state: RecordState) -> StoreResult<()>;
}
