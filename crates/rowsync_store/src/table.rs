//! Table store trait definition.

use crate::error::StoreResult;
use rowsync_model::{RecordKey, Row};

/// The status-column sentinel for an inactive (soft-deleted) row.
pub const INACTIVE: i64 = 0;

/// The status-column sentinel for an active row.
pub const ACTIVE: i64 = 1;

/// A persistence handle bound to one local table.
///
/// Table stores are **opaque row stores** keyed by natural key. The loader
/// does not know how rows are laid out or queried; it only needs find, save,
/// and delete. Query and transaction mechanics belong to implementations.
///
/// # Invariants
///
/// - `save` is an idempotent upsert: saving the same row twice leaves the
///   same persisted state, never a duplicate
/// - `delete` is redefined as a **cascading soft delete**: it sets the
///   table's status column to [`INACTIVE`], preserves every other column
///   (including audit fields such as a deletion timestamp), and repeats the
///   same operation on dependent tables' matching rows
/// - Stores must be `Send + Sync`; independent runs may target disjoint
///   tables from separate threads
///
/// # Implementors
///
/// - [`super::MemoryTableStore`] - for tests and ephemeral runs
/// - [`super::FileTableStore`] - JSON-file-backed, for the CLI
pub trait TableStore: Send + Sync {
    /// Returns the name of the bound table.
    fn table(&self) -> &str;

    /// Looks up a row by natural key.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails; an absent row is
    /// `Ok(None)`, not an error.
    fn find(&self, key: RecordKey) -> StoreResult<Option<Row>>;

    /// Creates or updates a row, keyed by `row.key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be persisted.
    fn save(&self, row: &Row) -> StoreResult<()>;

    /// Soft-deletes a row and cascades to dependent tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the row does not exist or the cascade fails
    /// partway; callers treat that as an integrity-threatening condition.
    fn delete(&self, key: RecordKey) -> StoreResult<()>;

    /// Returns the keys of rows whose `column` holds the integer `value`.
    ///
    /// Used by parent tables to locate dependent rows during a cascade.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn keys_matching(&self, column: &str, value: i64) -> StoreResult<Vec<RecordKey>>;
}
