//! The generic sync orchestrator.
//!
//! A [`DataLoader`] pulls pages from a [`RemoteSource`], maps each record
//! through its [`LoaderVariant`]'s functions, persists the result through a
//! [`TableStore`], and checkpoints progress through a
//! [`crate::SyncStatusTracker`].
//!
//! ## Key Invariants
//!
//! - Records are processed strictly in fetch order; at most one record is
//!   mid-flight at a time.
//! - One bad record never aborts a run: key, lookup, format, pre-save, and
//!   persist failures are recorded in the [`RunResult`] and processing
//!   continues with the next record.
//! - A post-save failure aborts the run. The row has already been
//!   persisted, so a failed cascade leaves dependents out of step with
//!   their parent, and continuing would widen the inconsistency.
//! - The cursor is checkpointed after every fully processed page, so a
//!   crashed or cancelled run resumes at page granularity. Refetching a
//!   partially processed page is safe because saves are idempotent.

use crate::config::LoaderConfig;
use crate::error::{FailureStage, HookError, LoadError, LoadResult, RecordFailure};
use crate::progress::{ProgressSink, RecordAction};
use crate::source::RemoteSource;
use crate::tracker::SyncStatusTracker;
use rowsync_model::{
    Cursor, Endpoint, FieldError, MappedFields, RecordKey, RecordState, RemoteRecord, Row,
    RunOutcome,
};
use rowsync_store::TableStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Extracts the natural key from a remote record.
pub type KeyFn = fn(&RemoteRecord) -> Result<RecordKey, FieldError>;

/// Maps a remote record to local column values.
pub type FormatFn = fn(&RemoteRecord) -> Result<MappedFields, FieldError>;

/// A hook invoked around persistence with full pipeline context.
pub type HookFn = fn(&mut HookContext<'_>) -> Result<(), HookError>;

/// Everything a hook can see and touch for the record in flight.
pub struct HookContext<'a> {
    /// The remote record being processed.
    pub record: &'a RemoteRecord,
    /// The local row, already carrying the formatted fields.
    pub row: &'a mut Row,
    /// The table the loader persists into.
    pub table: &'a dyn TableStore,
    /// The run's progress sink.
    pub progress: &'a dyn ProgressSink,
    /// The endpoint being synced.
    pub endpoint: &'a Endpoint,
}

/// The per-endpoint configuration of a [`DataLoader`].
///
/// A variant is plain data: the pair it covers plus function references for
/// the steps that differ between endpoints. Everything else about a run is
/// shared orchestration.
#[derive(Clone)]
pub struct LoaderVariant {
    /// The endpoint this variant syncs.
    pub endpoint: Endpoint,
    /// The record-state filter this variant syncs.
    pub state: RecordState,
    /// Extracts the natural key from a record.
    pub key_of: KeyFn,
    /// Maps a record to local column values.
    pub format: FormatFn,
    /// Runs after format, before persistence. Failures skip the record.
    pub pre_save: Option<HookFn>,
    /// Runs after persistence. Failures abort the run.
    pub post_save: Option<HookFn>,
}

/// Summary of one sync run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// The endpoint that was synced.
    pub endpoint: Endpoint,
    /// The record-state filter that was synced.
    pub state: RecordState,
    /// Number of fully processed pages.
    pub pages: u32,
    /// Number of records pulled off the source.
    pub seen: u64,
    /// Number of records persisted (and post-saved) successfully.
    pub succeeded: u64,
    /// Number of records skipped (deleted remotely, absent locally).
    pub skipped: u64,
    /// The record-level failures, in encounter order.
    pub failures: Vec<RecordFailure>,
    /// The furthest cursor handed out by the source during this run.
    pub cursor: Option<Cursor>,
    /// How the run ended.
    pub outcome: RunOutcome,
}

impl RunResult {
    /// Creates an empty summary for a pair.
    pub fn new(endpoint: Endpoint, state: RecordState) -> Self {
        Self {
            endpoint,
            state,
            pages: 0,
            seen: 0,
            succeeded: 0,
            skipped: 0,
            failures: Vec::new(),
            cursor: None,
            outcome: RunOutcome::Success,
        }
    }

    /// Number of record-level failures.
    pub fn failed(&self) -> u64 {
        self.failures.len() as u64
    }
}

/// Orchestrates one endpoint's sync from a remote source into a local table.
pub struct DataLoader {
    variant: LoaderVariant,
    config: LoaderConfig,
    source: Arc<dyn RemoteSource>,
    table: Arc<dyn TableStore>,
    tracker: SyncStatusTracker,
    progress: Arc<dyn ProgressSink>,
    cancelled: AtomicBool,
}

impl DataLoader {
    /// Creates a loader from its collaborators.
    pub fn new(
        variant: LoaderVariant,
        config: LoaderConfig,
        source: Arc<dyn RemoteSource>,
        table: Arc<dyn TableStore>,
        tracker: SyncStatusTracker,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            variant,
            config,
            source,
            table,
            tracker,
            progress,
            cancelled: AtomicBool::new(false),
        }
    }

    /// Requests a graceful stop.
    ///
    /// The flag is checked between records; the run checkpoints what it has
    /// and returns with a [`RunOutcome::Partial`] summary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Runs the sync to completion, cancellation, or failure.
    ///
    /// Per-record failures are aggregated in the returned [`RunResult`];
    /// a failed page fetch ends the run with [`RunOutcome::Failed`] but
    /// still returns `Ok`. Only cascade-integrity and status-store failures
    /// surface as `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Cascade`] when a post-save hook fails, and
    /// [`LoadError::Status`] when the status store fails.
    pub fn run(&self) -> LoadResult<RunResult> {
        if !self.config.resume {
            self.tracker.reset()?;
        }

        let mut cursor = self.tracker.start_cursor()?;
        let mut result = RunResult::new(self.variant.endpoint.clone(), self.variant.state);
        debug!(
            endpoint = %self.variant.endpoint,
            state = %self.variant.state,
            resume_from = ?cursor,
            "starting sync run"
        );

        let mut exhausted = false;
        let mut interrupted = false;

        'pages: loop {
            let page = match self
                .source
                .fetch_page(&self.variant.endpoint, self.variant.state, cursor.as_ref())
            {
                Ok(page) => page,
                Err(err) => {
                    warn!(
                        endpoint = %self.variant.endpoint,
                        state = %self.variant.state,
                        cursor = ?cursor,
                        error = %err,
                        "page fetch failed, ending run"
                    );
                    result.outcome = RunOutcome::Failed;
                    self.tracker
                        .finish(RunOutcome::Failed, None, result.failed())?;
                    return Ok(result);
                }
            };

            for record in &page.records {
                if self.cancelled.load(Ordering::Relaxed) {
                    // Stop before the page checkpoint so a resumed run
                    // refetches this page from its own cursor.
                    interrupted = true;
                    break 'pages;
                }
                if let Err(err) = self.process_record(record, &mut result) {
                    self.tracker
                        .finish(RunOutcome::Failed, None, result.failed())?;
                    return Err(err);
                }
            }

            result.pages += 1;
            self.progress.page(
                &self.variant.endpoint,
                self.variant.state,
                result.pages,
                result.seen,
            );
            self.tracker
                .checkpoint(page.next_cursor.as_ref(), result.failed())?;

            match page.next_cursor {
                Some(next) => {
                    result.cursor = Some(next.clone());
                    cursor = Some(next);
                }
                None => {
                    exhausted = true;
                    break;
                }
            }

            if let Some(max) = self.config.max_pages {
                if result.pages >= max {
                    break;
                }
            }
        }

        result.outcome = if interrupted || !exhausted || !result.failures.is_empty() {
            RunOutcome::Partial
        } else {
            RunOutcome::Success
        };
        self.tracker
            .finish(result.outcome, None, result.failed())?;
        debug!(
            endpoint = %self.variant.endpoint,
            state = %self.variant.state,
            outcome = %result.outcome,
            seen = result.seen,
            succeeded = result.succeeded,
            failed = result.failed(),
            "sync run finished"
        );
        Ok(result)
    }

    fn process_record(&self, record: &RemoteRecord, result: &mut RunResult) -> LoadResult<()> {
        result.seen += 1;

        let key = match (self.variant.key_of)(record) {
            Ok(key) => key,
            Err(err) => {
                self.record_failure(result, None, FailureStage::Key, err.to_string());
                return Ok(());
            }
        };

        let existing = match self.table.find(key) {
            Ok(existing) => existing,
            Err(err) => {
                self.record_failure(result, Some(key), FailureStage::Lookup, err.to_string());
                return Ok(());
            }
        };
        let existed = existing.is_some();

        // A deleted-state run only touches rows that were synced while
        // active; it never creates rows just to mark them inactive.
        if !existed && self.variant.state == RecordState::Deleted {
            warn!(
                endpoint = %self.variant.endpoint,
                key,
                "deleted record has no local row, skipping"
            );
            result.skipped += 1;
            self.progress
                .record(&self.variant.endpoint, key, RecordAction::Skipped);
            return Ok(());
        }

        let mut row = existing.unwrap_or_else(|| Row::new(key));

        let fields = match (self.variant.format)(record) {
            Ok(fields) => fields,
            Err(err) => {
                self.record_failure(result, Some(key), FailureStage::Format, err.to_string());
                return Ok(());
            }
        };
        row.assign(fields);

        if let Some(pre_save) = self.variant.pre_save {
            let mut ctx = HookContext {
                record,
                row: &mut row,
                table: self.table.as_ref(),
                progress: self.progress.as_ref(),
                endpoint: &self.variant.endpoint,
            };
            if let Err(err) = pre_save(&mut ctx) {
                self.record_failure(result, Some(key), FailureStage::PreSave, err.to_string());
                return Ok(());
            }
        }

        if let Err(err) = self.table.save(&row) {
            self.record_failure(result, Some(key), FailureStage::Persist, err.to_string());
            return Ok(());
        }

        // A record only counts as succeeded once its post-save side effects
        // went through; a cascade failure must leave N out of the summary.
        if let Some(post_save) = self.variant.post_save {
            let mut ctx = HookContext {
                record,
                row: &mut row,
                table: self.table.as_ref(),
                progress: self.progress.as_ref(),
                endpoint: &self.variant.endpoint,
            };
            if let Err(err) = post_save(&mut ctx) {
                return Err(LoadError::cascade(
                    self.variant.endpoint.clone(),
                    self.variant.state,
                    key,
                    err.to_string(),
                    result.clone(),
                ));
            }
        }

        result.succeeded += 1;
        let action = if existed {
            RecordAction::Updated
        } else {
            RecordAction::Created
        };
        self.progress.record(&self.variant.endpoint, key, action);

        Ok(())
    }

    fn record_failure(
        &self,
        result: &mut RunResult,
        key: Option<RecordKey>,
        stage: FailureStage,
        message: String,
    ) {
        warn!(
            endpoint = %self.variant.endpoint,
            key = ?key,
            stage = %stage,
            message,
            "record failed"
        );
        self.progress.failure(&self.variant.endpoint, key, &message);
        result.failures.push(RecordFailure {
            key,
            stage,
            message,
        });
    }
}
