//! JSON-file-backed stores for the command-line tools.

use crate::error::{StoreError, StoreResult};
use crate::status::StatusStore;
use crate::table::{TableStore, INACTIVE};
use parking_lot::RwLock;
use rowsync_model::{Endpoint, FieldValue, RecordKey, RecordState, Row, SyncStatus};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
struct Dependent {
    table: Arc<dyn TableStore>,
    parent_key_column: String,
}

/// A table store persisted as one JSON file per table.
///
/// The whole table is loaded at open and rewritten on every mutation. That
/// is deliberate: sync runs are bounded batch jobs, not a serving path, and
/// a rewrite per record keeps crash recovery trivial (the file is always a
/// complete snapshot).
pub struct FileTableStore {
    name: String,
    status_column: String,
    path: PathBuf,
    rows: RwLock<BTreeMap<RecordKey, Row>>,
    dependents: RwLock<Vec<Dependent>>,
}

impl FileTableStore {
    /// Opens (or creates) the table file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        status_column: impl Into<String>,
    ) -> StoreResult<Self> {
        let path = path.into();
        let rows = if path.exists() {
            let bytes = fs::read(&path)?;
            let all: Vec<Row> = serde_json::from_slice(&bytes)?;
            all.into_iter().map(|row| (row.key, row)).collect()
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            name: name.into(),
            status_column: status_column.into(),
            path,
            rows: RwLock::new(rows),
            dependents: RwLock::new(Vec::new()),
        })
    }

    /// Registers a dependent table for cascade deletes.
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

    fn flush(&self, rows: &BTreeMap<RecordKey, Row>) -> StoreResult<()> {
        let all: Vec<&Row> = rows.values().collect();
        let bytes = serde_json::to_vec_pretty(&all)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl TableStore for FileTableStore {
    fn table(&self) -> &str {
        &self.name
    }

    fn find(&self, key: RecordKey) -> StoreResult<Option<Row>> {
        Ok(self.rows.read().get(&key).cloned())
    }

    fn save(&self, row: &Row) -> StoreResult<()> {
        let mut rows = self.rows.write();
        rows.insert(row.key, row.clone());
        self.flush(&rows)
    }

    fn delete(&self, key: RecordKey) -> StoreResult<()> {
        {
            let mut rows = self.rows.write();
            let row = rows.get_mut(&key).ok_or_else(|| StoreError::RowNotFound {
                table: self.name.clone(),
                key,
            })?;
            row.set_field(self.status_column.clone(), FieldValue::State(INACTIVE));
            self.flush(&rows)?;
        }

        let dependents = self.dependents.read().clone();
        for dep in dependents {
            for child_key in dep.table.keys_matching(&dep.parent_key_column, key)? {
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

/// A sync-status store persisted as a single JSON file.
pub struct FileStatusStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<(String, String), SyncStatus>>,
}

fn status_key(endpoint: &Endpoint, state: RecordState) -> (String, String) {
    (endpoint.as_str().to_string(), state.as_str().to_string())
}

impl FileStatusStore {
    /// Opens (or creates) the status file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let bytes = fs::read(&path)?;
            let all: Vec<SyncStatus> = serde_json::from_slice(&bytes)?;
            all.into_iter()
                .map(|status| (status_key(&status.endpoint, status.state), status))
                .collect()
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<(String, String), SyncStatus>) -> StoreResult<()> {
        let all: Vec<&SyncStatus> = entries.values().collect();
        let bytes = serde_json::to_vec_pretty(&all)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl StatusStore for FileStatusStore {
    fn get(&self, endpoint: &Endpoint, state: RecordState) -> StoreResult<Option<SyncStatus>> {
        Ok(self.entries.read().get(&status_key(endpoint, state)).cloned())
    }

    fn put(&self, status: SyncStatus) -> StoreResult<()> {
        let mut entries = self.entries.write();
        entries.insert(status_key(&status.endpoint, status.state), status);
        self.flush(&entries)
    }

    fn all(&self) -> StoreResult<Vec<SyncStatus>> {
        Ok(self.entries.read().values().cloned().collect())
    }

    fn remove(&self, endpoint: &Endpoint, state: RecordState) -> StoreResult<()> {
        let mut entries = self.entries.write();
        entries.remove(&status_key(endpoint, state));
        self.flush(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowsync_model::RunOutcome;

    #[test]
    fn table_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");

        {
            let store = FileTableStore::open(&path, "events", "eventsStatus").unwrap();
            let mut row = Row::new(42);
            row.set_field("eventsStatus", FieldValue::State(1));
            row.set_field("deleted_at", FieldValue::Timestamp("2013-05-01".into()));
            store.save(&row).unwrap();
        }

        let store = FileTableStore::open(&path, "events", "eventsStatus").unwrap();
        assert_eq!(store.row_count(), 1);
        let row = store.find(42).unwrap().unwrap();
        assert_eq!(
            row.field("deleted_at"),
            Some(&FieldValue::Timestamp("2013-05-01".into()))
        );
    }

    #[test]
    fn delete_cascades_across_files() {
        let dir = tempfile::tempdir().unwrap();

        let performers = Arc::new(
            FileTableStore::open(
                dir.path().join("event_performers.json"),
                "event_performers",
                "eventPerformersStatus",
            )
            .unwrap(),
        );
        let events =
            FileTableStore::open(dir.path().join("events.json"), "events", "eventsStatus").unwrap();
        events.add_dependent(Arc::clone(&performers) as Arc<dyn TableStore>, "eventId");

        let mut event = Row::new(42);
        event.set_field("eventsStatus", FieldValue::State(1));
        events.save(&event).unwrap();

        let mut link = Row::new(7);
        link.set_field("eventId", 42i64);
        link.set_field("eventPerformersStatus", FieldValue::State(1));
        performers.save(&link).unwrap();

        events.delete(42).unwrap();

        // The cascade must already be on disk
        let reopened = FileTableStore::open(
            dir.path().join("event_performers.json"),
            "event_performers",
            "eventPerformersStatus",
        )
        .unwrap();
        let link = reopened.find(7).unwrap().unwrap();
        assert_eq!(
            link.field("eventPerformersStatus"),
            Some(&FieldValue::State(0))
        );
    }

    #[test]
    fn status_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");

        {
            let store = FileStatusStore::open(&path).unwrap();
            let mut status = SyncStatus::new(Endpoint::new("events"), RecordState::Deleted);
            status.last_outcome = RunOutcome::Success;
            status.cursor = Some(rowsync_model::Cursor::new("3"));
            store.put(status).unwrap();
        }

        let store = FileStatusStore::open(&path).unwrap();
        let status = store
            .get(&Endpoint::new("events"), RecordState::Deleted)
            .unwrap()
            .unwrap();
        assert_eq!(status.last_outcome, RunOutcome::Success);
        assert_eq!(status.cursor.unwrap().as_str(), "3");
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        fs::write(&path, b"not json").unwrap();

        let result = FileTableStore::open(&path, "events", "eventsStatus");
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
