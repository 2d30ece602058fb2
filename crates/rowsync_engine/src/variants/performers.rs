//! Loader variants for the `performers` endpoint.

use super::cascade_delete;
use crate::loader::LoaderVariant;
use rowsync_model::{
    Endpoint, FieldError, FieldValue, MappedFields, RecordKey, RecordState, RemoteRecord,
};
use rowsync_store::{ACTIVE, INACTIVE};

/// The local performers table.
pub const TABLE: &str = "tevoPerformers";

/// The performers table's status column.
pub const STATUS_COLUMN: &str = "performersStatus";

/// The column on dependent tables that references a performer.
pub const KEY_COLUMN: &str = "performerId";

fn key_of(record: &RemoteRecord) -> Result<RecordKey, FieldError> {
    record.require_i64("id")
}

fn format_active(record: &RemoteRecord) -> Result<MappedFields, FieldError> {
    let mut fields = MappedFields::new()
        .with(KEY_COLUMN, record.require_i64("id")?)
        .with("name", record.require_str("name")?)
        .with(STATUS_COLUMN, FieldValue::State(ACTIVE));
    if let Some(updated_at) = record.opt_str("updated_at")? {
        fields.set("updated_at", FieldValue::Timestamp(updated_at.to_string()));
    }
    Ok(fields)
}

fn format_deleted(record: &RemoteRecord) -> Result<MappedFields, FieldError> {
    Ok(MappedFields::new()
        .with(KEY_COLUMN, record.require_i64("id")?)
        .with(
            "deleted_at",
            FieldValue::Timestamp(record.require_str("deleted_at")?.to_string()),
        )
        .with(STATUS_COLUMN, FieldValue::State(INACTIVE)))
}

/// The variant syncing currently live performers.
pub fn active() -> LoaderVariant {
    LoaderVariant {
        endpoint: Endpoint::new("performers"),
        state: RecordState::Active,
        key_of,
        format: format_active,
        pre_save: None,
        post_save: None,
    }
}

/// The variant syncing remotely deleted performers.
pub fn deleted() -> LoaderVariant {
    LoaderVariant {
        endpoint: Endpoint::new("performers"),
        state: RecordState::Deleted,
        key_of,
        format: format_deleted,
        pre_save: None,
        post_save: Some(cascade_delete),
    }
}
