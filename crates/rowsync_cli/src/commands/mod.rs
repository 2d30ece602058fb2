//! CLI command implementations.

pub mod reset;
pub mod run;
pub mod status;

use rowsync_engine::variants;
use rowsync_model::RecordState;
use rowsync_store::{FileStatusStore, FileTableStore, StoreResult, TableStore};
use std::path::Path;
use std::sync::Arc;

/// The file name of the sync-status store inside the data directory.
pub const STATUS_FILE: &str = "sync_status.json";

/// All catalog tables, opened from the data directory and wired together
/// for cascade deletes.
pub struct Tables {
    /// The events table.
    pub events: Arc<FileTableStore>,
    /// The performers table.
    pub performers: Arc<FileTableStore>,
    /// The event-to-performer join table.
    pub event_performers: Arc<FileTableStore>,
}

impl Tables {
    /// Opens every catalog table under `data` and registers the join table
    /// as a dependent of both parents.
    ///
    /// # Errors
    ///
    /// Returns an error if any table file cannot be read or parsed.
    pub fn open(data: &Path) -> StoreResult<Self> {
        let event_performers = Arc::new(FileTableStore::open(
            data.join(format!("{}.json", variants::EVENT_PERFORMERS_TABLE)),
            variants::EVENT_PERFORMERS_TABLE,
            variants::EVENT_PERFORMERS_STATUS_COLUMN,
        )?);
        let events = Arc::new(FileTableStore::open(
            data.join(format!("{}.json", variants::events::TABLE)),
            variants::events::TABLE,
            variants::events::STATUS_COLUMN,
        )?);
        let performers = Arc::new(FileTableStore::open(
            data.join(format!("{}.json", variants::performers::TABLE)),
            variants::performers::TABLE,
            variants::performers::STATUS_COLUMN,
        )?);

        events.add_dependent(
            Arc::clone(&event_performers) as Arc<dyn TableStore>,
            variants::events::KEY_COLUMN,
        );
        performers.add_dependent(
            Arc::clone(&event_performers) as Arc<dyn TableStore>,
            variants::performers::KEY_COLUMN,
        );

        Ok(Self {
            events,
            performers,
            event_performers,
        })
    }

    /// Returns the table a given endpoint syncs into.
    pub fn for_endpoint(&self, endpoint: &str) -> Option<Arc<dyn TableStore>> {
        match endpoint {
            "events" => Some(Arc::clone(&self.events) as Arc<dyn TableStore>),
            "performers" => Some(Arc::clone(&self.performers) as Arc<dyn TableStore>),
            _ => None,
        }
    }
}

/// Opens the status store inside the data directory.
///
/// # Errors
///
/// Returns an error if the status file cannot be read or parsed.
pub fn open_status(data: &Path) -> StoreResult<FileStatusStore> {
    FileStatusStore::open(data.join(STATUS_FILE))
}

/// Resolves the built-in variant for an (endpoint, state) pair.
pub fn variant_for(
    endpoint: &str,
    state: RecordState,
) -> Option<rowsync_engine::LoaderVariant> {
    match (endpoint, state) {
        ("events", RecordState::Active) => Some(variants::events::active()),
        ("events", RecordState::Deleted) => Some(variants::events::deleted()),
        ("performers", RecordState::Active) => Some(variants::performers::active()),
        ("performers", RecordState::Deleted) => Some(variants::performers::deleted()),
        _ => None,
    }
}
