//! In-memory stores for testing and ephemeral runs.

use crate::error::{StoreError, StoreResult};
use crate::status::StatusStore;
use crate::table::{TableStore, INACTIVE};
use parking_lot::{Mutex, RwLock};
use rowsync_model::{Endpoint, FieldValue, RecordKey, RecordState, Row, SyncStatus};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A dependent-table registration for cascade deletes.
#[derive(Clone)]
struct Dependent {
    table: Arc<dyn TableStore>,
    parent_key_column: String,
}

/// An in-memory table store.
///
/// Suitable for unit tests, integration tests, and ephemeral syncs that do
/// not need persistence. Dependent tables can be registered so `delete`
/// cascades the soft delete the way a relational storage layer would.
///
/// For failure-isolation tests the store supports injected failures per
/// natural key (`set_fail_save_for` / `set_fail_delete_for`).
///
/// # Thread Safety
///
/// The store is thread-safe and can be shared across threads.
pub struct MemoryTableStore {
    name: String,
    status_column: String,
    rows: RwLock<BTreeMap<RecordKey, Row>>,
    dependents: RwLock<Vec<Dependent>>,
    fail_save_for: Mutex<Option<RecordKey>>,
    fail_delete_for: Mutex<Option<RecordKey>>,
}

impl MemoryTableStore {
    /// Creates an empty table store bound to `name`.
    ///
    /// `status_column` is the column `delete` flips to [`INACTIVE`].
    pub fn new(name: impl Into<String>, status_column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status_column: status_column.into(),
            rows: RwLock::new(BTreeMap::new()),
            dependents: RwLock::new(Vec::new()),
            fail_save_for: Mutex::new(None),
            fail_delete_for: Mutex::new(None),
        }
    }

    /// Registers a dependent table for cascade deletes.
    ///
    /// When a row with key `k` is deleted here, every row in `table` whose
    /// `parent_key_column` equals `k` is deleted there as well (recursively).
    pub fn add_dependent(&self, table: Arc<dyn TableStore>, parent_key_column: impl Into<String>) {
        self.dependents.write().push(Dependent {
            table,
            parent_key_column: parent_key_column.into(),
        });
    }

    /// Returns the number of stored rows.
    pub fn row_count(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns a snapshot of all rows, ordered by key.
    pub fn rows(&self) -> Vec<Row> {
        self.rows.read().values().cloned().collect()
    }

    /// Makes `save` fail for the given key until cleared.
    pub fn set_fail_save_for(&self, key: Option<RecordKey>) {
        *self.fail_save_for.lock() = key;
    }

    /// Makes `delete` fail for the given key until cleared.
    pub fn set_fail_delete_for(&self, key: Option<RecordKey>) {
        *self.fail_delete_for.lock() = key;
    }
}

impl TableStore for MemoryTableStore {
    fn table(&self) -> &str {
        &self.name
    }

    fn find(&self, key: RecordKey) -> StoreResult<Option<Row>> {
        Ok(self.rows.read().get(&key).cloned())
    }

    fn save(&self, row: &Row) -> StoreResult<()> {
        if *self.fail_save_for.lock() == Some(row.key) {
            return Err(StoreError::backend(format!(
                "injected save failure for key {} in `{}`",
                row.key, self.name
            )));
        }
        self.rows.write().insert(row.key, row.clone());
        Ok(())
    }

    fn delete(&self, key: RecordKey) -> StoreResult<()> {
        if *self.fail_delete_for.lock() == Some(key) {
            return Err(StoreError::backend(format!(
                "injected delete failure for key {} in `{}`",
                key, self.name
            )));
        }

        {
            let mut rows = self.rows.write();
            let row = rows.get_mut(&key).ok_or_else(|| StoreError::RowNotFound {
                table: self.name.clone(),
                key,
            })?;
            row.set_field(self.status_column.clone(), FieldValue::State(INACTIVE));
        }

        // Cascade outside the row lock; a table is never its own dependent.
        let dependents = self.dependents.read().clone();
        for dep in dependents {
            let child_keys = dep.table.keys_matching(&dep.parent_key_column, key)?;
            if !child_keys.is_empty() {
                tracing::debug!(
                    table = %self.name,
                    dependent = %dep.table.table(),
                    key,
                    count = child_keys.len(),
                    "cascading soft delete"
                );
            }
            for child_key in child_keys {
                dep.table.delete(child_key)?;
            }
        }

        Ok(())
    }

    fn keys_matching(&self, column: &str, value: i64) -> StoreResult<Vec<RecordKey>> {
        Ok(self
            .rows
            .read()
            .values()
            .filter(|row| row.field(column).and_then(FieldValue::as_i64) == Some(value))
            .map(|row| row.key)
            .collect())
    }
}

/// An in-memory sync-status store.
///
/// Entries are keyed by (endpoint, state); updates replace the whole entry
/// atomically under the store lock (last writer wins).
#[derive(Default)]
pub struct MemoryStatusStore {
    entries: RwLock<BTreeMap<(String, String), SyncStatus>>,
}

fn status_key(endpoint: &Endpoint, state: RecordState) -> (String, String) {
    (endpoint.as_str().to_string(), state.as_str().to_string())
}

impl MemoryStatusStore {
    /// Creates an empty status store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusStore for MemoryStatusStore {
    fn get(&self, endpoint: &Endpoint, state: RecordState) -> StoreResult<Option<SyncStatus>> {
        Ok(self.entries.read().get(&status_key(endpoint, state)).cloned())
    }

    fn put(&self, status: SyncStatus) -> StoreResult<()> {
        let key = status_key(&status.endpoint, status.state);
        self.entries.write().insert(key, status);
        Ok(())
    }

    fn all(&self) -> StoreResult<Vec<SyncStatus>> {
        Ok(self.entries.read().values().cloned().collect())
    }

    fn remove(&self, endpoint: &Endpoint, state: RecordState) -> StoreResult<()> {
        self.entries.write().remove(&status_key(endpoint, state));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rowsync_model::{MappedFields, RunOutcome};

    fn event_row(key: RecordKey, status: i64) -> Row {
        let mut row = Row::new(key);
        row.set_field("eventId", key);
        row.set_field("eventsStatus", FieldValue::State(status));
        row
    }

    #[test]
    fn save_is_an_upsert() {
        let store = MemoryTableStore::new("events", "eventsStatus");

        store.save(&event_row(42, 1)).unwrap();
        store.save(&event_row(42, 1)).unwrap();

        assert_eq!(store.row_count(), 1);
        let found = store.find(42).unwrap().unwrap();
        assert_eq!(found.field("eventsStatus"), Some(&FieldValue::State(1)));
    }

    #[test]
    fn find_absent_row_is_none() {
        let store = MemoryTableStore::new("events", "eventsStatus");
        assert!(store.find(7).unwrap().is_none());
    }

    #[test]
    fn delete_flips_status_and_preserves_columns() {
        let store = MemoryTableStore::new("events", "eventsStatus");
        let mut row = event_row(42, 1);
        row.set_field("deleted_at", FieldValue::Timestamp("2013-05-01".into()));
        store.save(&row).unwrap();

        store.delete(42).unwrap();

        let found = store.find(42).unwrap().unwrap();
        assert_eq!(found.field("eventsStatus"), Some(&FieldValue::State(0)));
        assert_eq!(
            found.field("deleted_at"),
            Some(&FieldValue::Timestamp("2013-05-01".into()))
        );
    }

    #[test]
    fn delete_missing_row_fails() {
        let store = MemoryTableStore::new("events", "eventsStatus");
        let err = store.delete(42).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn delete_cascades_to_dependents() {
        let performers = Arc::new(MemoryTableStore::new(
            "event_performers",
            "eventPerformersStatus",
        ));
        let events = MemoryTableStore::new("events", "eventsStatus");
        events.add_dependent(Arc::clone(&performers) as Arc<dyn TableStore>, "eventId");

        events.save(&event_row(42, 1)).unwrap();
        let mut link = Row::new(7);
        link.set_field("eventId", 42i64);
        link.set_field("eventPerformersStatus", FieldValue::State(1));
        performers.save(&link).unwrap();
        // A link for another event must stay active
        let mut other = Row::new(8);
        other.set_field("eventId", 99i64);
        other.set_field("eventPerformersStatus", FieldValue::State(1));
        performers.save(&other).unwrap();

        events.delete(42).unwrap();

        let link = performers.find(7).unwrap().unwrap();
        assert_eq!(
            link.field("eventPerformersStatus"),
            Some(&FieldValue::State(0))
        );
        let other = performers.find(8).unwrap().unwrap();
        assert_eq!(
            other.field("eventPerformersStatus"),
            Some(&FieldValue::State(1))
        );
    }

    #[test]
    fn cascade_is_recursive() {
        let grandchild = Arc::new(MemoryTableStore::new("tickets", "ticketsStatus"));
        let child = Arc::new(MemoryTableStore::new(
            "event_performers",
            "eventPerformersStatus",
        ));
        child.add_dependent(Arc::clone(&grandchild) as Arc<dyn TableStore>, "linkId");
        let events = MemoryTableStore::new("events", "eventsStatus");
        events.add_dependent(Arc::clone(&child) as Arc<dyn TableStore>, "eventId");

        events.save(&event_row(1, 1)).unwrap();
        let mut link = Row::new(10);
        link.set_field("eventId", 1i64);
        link.set_field("eventPerformersStatus", FieldValue::State(1));
        child.save(&link).unwrap();
        let mut ticket = Row::new(100);
        ticket.set_field("linkId", 10i64);
        ticket.set_field("ticketsStatus", FieldValue::State(1));
        grandchild.save(&ticket).unwrap();

        events.delete(1).unwrap();

        let ticket = grandchild.find(100).unwrap().unwrap();
        assert_eq!(ticket.field("ticketsStatus"), Some(&FieldValue::State(0)));
    }

    #[test]
    fn injected_failures() {
        let store = MemoryTableStore::new("events", "eventsStatus");
        store.save(&event_row(42, 1)).unwrap();

        store.set_fail_delete_for(Some(42));
        assert!(store.delete(42).is_err());

        store.set_fail_delete_for(None);
        store.delete(42).unwrap();

        store.set_fail_save_for(Some(43));
        assert!(store.save(&event_row(43, 1)).is_err());
        store.save(&event_row(44, 1)).unwrap();
    }

    #[test]
    fn status_store_round_trip() {
        let store = MemoryStatusStore::new();
        let endpoint = Endpoint::new("events");

        assert!(store.get(&endpoint, RecordState::Deleted).unwrap().is_none());

        let mut status = SyncStatus::new(endpoint.clone(), RecordState::Deleted);
        status.last_outcome = RunOutcome::Success;
        store.put(status.clone()).unwrap();

        let found = store.get(&endpoint, RecordState::Deleted).unwrap().unwrap();
        assert_eq!(found, status);
        // Active state is tracked separately
        assert!(store.get(&endpoint, RecordState::Active).unwrap().is_none());

        assert_eq!(store.all().unwrap().len(), 1);
        store.remove(&endpoint, RecordState::Deleted).unwrap();
        assert!(store.all().unwrap().is_empty());
    }

    proptest! {
        // Re-processing the same mapped fields must be idempotent: saving a
        // row formatted from the same input twice leaves the same state as
        // saving it once, and never a duplicate row.
        #[test]
        fn upsert_idempotence(key in 1i64..10_000, columns in proptest::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..8)) {
            let fields: MappedFields = columns
                .into_iter()
                .map(|(name, value)| (name, FieldValue::Integer(value)))
                .collect();

            let once = MemoryTableStore::new("events", "eventsStatus");
            let mut row = Row::new(key);
            row.assign(fields.clone());
            once.save(&row).unwrap();

            let twice = MemoryTableStore::new("events", "eventsStatus");
            let mut row2 = Row::new(key);
            row2.assign(fields.clone());
            twice.save(&row2).unwrap();
            let mut row3 = Row::new(key);
            row3.assign(fields);
            twice.save(&row3).unwrap();

            prop_assert_eq!(once.rows(), twice.rows());
            prop_assert_eq!(twice.row_count(), 1);
        }
    }
}
