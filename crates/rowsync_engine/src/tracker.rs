//! Resumable cursor tracking for one (endpoint, state) pair.
//!
//! The tracker is the loader's view onto the status store. It decides where
//! a run starts, checkpoints the cursor after every page, and records the
//! final outcome.
//!
//! ## Key Invariants
//!
//! - A checkpoint with no new cursor preserves the stored one; cursors only
//!   move forward, and only an explicit [`SyncStatusTracker::reset`] clears
//!   them.
//! - While a run is in flight the entry reads `Partial`, so a crashed run
//!   leaves a resumable checkpoint behind.

use rowsync_model::{Cursor, Endpoint, RecordState, RunOutcome, SyncStatus};
use rowsync_store::{StatusStore, StoreResult};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Tracks sync progress for one (endpoint, state) pair.
#[derive(Clone)]
pub struct SyncStatusTracker {
    store: Arc<dyn StatusStore>,
    endpoint: Endpoint,
    state: RecordState,
}

impl SyncStatusTracker {
    /// Creates a tracker for the pair, backed by `store`.
    pub fn new(store: Arc<dyn StatusStore>, endpoint: Endpoint, state: RecordState) -> Self {
        Self {
            store,
            endpoint,
            state,
        }
    }

    /// The endpoint this tracker covers.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The record-state filter this tracker covers.
    pub fn state(&self) -> RecordState {
        self.state
    }

    /// Reads the pair's current status entry, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the status store fails.
    pub fn status(&self) -> StoreResult<Option<SyncStatus>> {
        self.store.get(&self.endpoint, self.state)
    }

    /// Decides where a run should start.
    ///
    /// Returns the stored cursor when there is one worth resuming from.
    /// A pair that has never run, or whose last run ended `Failed`, starts
    /// from the beginning; a failed run may have left the stored cursor
    /// pointing at the page whose fetch broke, and refetching from the top
    /// is safe because persistence is idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the status store fails.
    pub fn start_cursor(&self) -> StoreResult<Option<Cursor>> {
        match self.status()? {
            None => Ok(None),
            Some(status) if status.last_outcome == RunOutcome::Failed => Ok(None),
            Some(status) => Ok(status.cursor),
        }
    }

    /// Checkpoints progress after one page.
    ///
    /// `next_cursor` is the cursor for the page after the one just
    /// processed; `None` (source exhausted, or a mid-page stop) preserves
    /// whatever cursor is already stored. The entry's outcome is set to
    /// `Partial` to mark the run as in flight.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be persisted.
    pub fn checkpoint(&self, next_cursor: Option<&Cursor>, error_count: u64) -> StoreResult<()> {
        self.upsert(|status| {
            if let Some(cursor) = next_cursor {
                status.cursor = Some(cursor.clone());
            }
            status.last_outcome = RunOutcome::Partial;
            status.error_count = error_count;
        })
    }

    /// Records the final outcome of a run.
    ///
    /// Like [`SyncStatusTracker::checkpoint`], a `None` cursor preserves
    /// the stored one.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be persisted.
    pub fn finish(
        &self,
        outcome: RunOutcome,
        cursor: Option<&Cursor>,
        error_count: u64,
    ) -> StoreResult<()> {
        self.upsert(|status| {
            if let Some(cursor) = cursor {
                status.cursor = Some(cursor.clone());
            }
            status.last_outcome = outcome;
            status.error_count = error_count;
        })
    }

    /// Removes the pair's entry so the next run starts from the beginning.
    ///
    /// # Errors
    ///
    /// Returns an error if the status store fails.
    pub fn reset(&self) -> StoreResult<()> {
        self.store.remove(&self.endpoint, self.state)
    }

    fn upsert(&self, update: impl FnOnce(&mut SyncStatus)) -> StoreResult<()> {
        let mut status = self
            .status()?
            .unwrap_or_else(|| SyncStatus::new(self.endpoint.clone(), self.state));
        status.last_run_at_ms = now_ms();
        update(&mut status);
        self.store.put(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowsync_store::MemoryStatusStore;

    fn tracker() -> SyncStatusTracker {
        SyncStatusTracker::new(
            Arc::new(MemoryStatusStore::new()),
            Endpoint::new("events"),
            RecordState::Deleted,
        )
    }

    #[test]
    fn first_run_starts_fresh() {
        let tracker = tracker();
        assert_eq!(tracker.start_cursor().unwrap(), None);
        assert!(tracker.status().unwrap().is_none());
    }

    #[test]
    fn checkpoint_then_resume() {
        let tracker = tracker();
        tracker.checkpoint(Some(&Cursor::new("page-2")), 0).unwrap();

        let status = tracker.status().unwrap().unwrap();
        assert_eq!(status.last_outcome, RunOutcome::Partial);
        assert!(status.last_run_at_ms > 0);
        assert_eq!(tracker.start_cursor().unwrap(), Some(Cursor::new("page-2")));
    }

    #[test]
    fn none_cursor_preserves_stored_one() {
        let tracker = tracker();
        tracker.checkpoint(Some(&Cursor::new("page-2")), 0).unwrap();
        tracker.checkpoint(None, 3).unwrap();

        let status = tracker.status().unwrap().unwrap();
        assert_eq!(status.cursor, Some(Cursor::new("page-2")));
        assert_eq!(status.error_count, 3);
    }

    #[test]
    fn failed_outcome_restarts_from_beginning() {
        let tracker = tracker();
        tracker.checkpoint(Some(&Cursor::new("page-2")), 0).unwrap();
        tracker.finish(RunOutcome::Failed, None, 0).unwrap();

        assert_eq!(tracker.start_cursor().unwrap(), None);
        // The stored cursor is preserved for inspection even though the
        // next run will not use it.
        let status = tracker.status().unwrap().unwrap();
        assert_eq!(status.cursor, Some(Cursor::new("page-2")));
    }

    #[test]
    fn success_outcome_resumes_from_stored_cursor() {
        let tracker = tracker();
        tracker.checkpoint(Some(&Cursor::new("page-5")), 0).unwrap();
        tracker.finish(RunOutcome::Success, None, 0).unwrap();

        assert_eq!(tracker.start_cursor().unwrap(), Some(Cursor::new("page-5")));
        let status = tracker.status().unwrap().unwrap();
        assert_eq!(status.last_outcome, RunOutcome::Success);
    }

    #[test]
    fn reset_clears_the_entry() {
        let tracker = tracker();
        tracker.checkpoint(Some(&Cursor::new("page-2")), 0).unwrap();
        tracker.reset().unwrap();

        assert!(tracker.status().unwrap().is_none());
        assert_eq!(tracker.start_cursor().unwrap(), None);
    }
}
