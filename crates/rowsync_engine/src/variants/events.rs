//! Loader variants for the `events` endpoint.

use super::cascade_delete;
use crate::loader::LoaderVariant;
use rowsync_model::{
    Endpoint, FieldError, FieldValue, MappedFields, RecordKey, RecordState, RemoteRecord,
};
use rowsync_store::{ACTIVE, INACTIVE};

/// The local events table.
pub const TABLE: &str = "tevoEvents";

/// The events table's status column.
pub const STATUS_COLUMN: &str = "eventsStatus";

/// The column on dependent tables that references an event.
pub const KEY_COLUMN: &str = "eventId";

fn key_of(record: &RemoteRecord) -> Result<RecordKey, FieldError> {
    record.require_i64("id")
}

fn format_active(record: &RemoteRecord) -> Result<MappedFields, FieldError> {
    let mut fields = MappedFields::new()
        .with(KEY_COLUMN, record.require_i64("id")?)
        .with("name", record.require_str("name")?)
        .with(STATUS_COLUMN, FieldValue::State(ACTIVE));
    if let Some(occurs_at) = record.opt_str("occurs_at")? {
        fields.set("occursAt", FieldValue::Timestamp(occurs_at.to_string()));
    }
    if let Some(venue_id) = record.opt_i64("venue_id")? {
        fields.set("venueId", venue_id);
    }
    if let Some(updated_at) = record.opt_str("updated_at")? {
        fields.set("updated_at", FieldValue::Timestamp(updated_at.to_string()));
    }
    Ok(fields)
}

fn format_deleted(record: &RemoteRecord) -> Result<MappedFields, FieldError> {
    Ok(MappedFields::new()
        .with(KEY_COLUMN, record.require_i64("id")?)
        .with("merged_into", record.pass_through("merged_into"))
        .with(
            "deleted_at",
            FieldValue::Timestamp(record.require_str("deleted_at")?.to_string()),
        )
        .with(STATUS_COLUMN, FieldValue::State(INACTIVE)))
}

/// The variant syncing currently live events.
pub fn active() -> LoaderVariant {
    LoaderVariant {
        endpoint: Endpoint::new("events"),
        state: RecordState::Active,
        key_of,
        format: format_active,
        pre_save: None,
        post_save: None,
    }
}

/// The variant syncing remotely deleted events.
///
/// Marks the local row inactive while preserving its other columns, records
/// the deletion time and any merge target, and cascades the soft delete to
/// the event's dependents.
pub fn deleted() -> LoaderVariant {
    LoaderVariant {
        endpoint: Endpoint::new("events"),
        state: RecordState::Deleted,
        key_of,
        format: format_deleted,
        pre_save: None,
        post_save: Some(cascade_delete),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deleted_format_marks_inactive_and_stamps_audit_fields() {
        let record = RemoteRecord::from_value(json!({
            "id": 42,
            "merged_into": null,
            "deleted_at": "2013-05-01"
        }))
        .unwrap();

        let fields = format_deleted(&record).unwrap();
        assert_eq!(fields.get(KEY_COLUMN), Some(&FieldValue::Integer(42)));
        assert_eq!(fields.get("merged_into"), Some(&FieldValue::Null));
        assert_eq!(
            fields.get("deleted_at"),
            Some(&FieldValue::Timestamp("2013-05-01".into()))
        );
        assert_eq!(fields.get(STATUS_COLUMN), Some(&FieldValue::State(INACTIVE)));
    }

    #[test]
    fn deleted_format_carries_a_merge_target() {
        let record = RemoteRecord::from_value(json!({
            "id": 42,
            "merged_into": 7,
            "deleted_at": "2013-05-01"
        }))
        .unwrap();

        let fields = format_deleted(&record).unwrap();
        assert_eq!(fields.get("merged_into"), Some(&FieldValue::Integer(7)));
    }

    #[test]
    fn deleted_format_requires_a_deletion_time() {
        let record = RemoteRecord::from_value(json!({"id": 42})).unwrap();
        assert!(format_deleted(&record).is_err());
    }

    #[test]
    fn active_format_marks_active() {
        let record = RemoteRecord::from_value(json!({
            "id": 5,
            "name": "Derby",
            "occurs_at": "2013-06-01T19:00:00Z",
            "venue_id": 77
        }))
        .unwrap();

        let fields = format_active(&record).unwrap();
        assert_eq!(fields.get(STATUS_COLUMN), Some(&FieldValue::State(ACTIVE)));
        assert_eq!(fields.get("name"), Some(&FieldValue::Text("Derby".into())));
        assert_eq!(
            fields.get("occursAt"),
            Some(&FieldValue::Timestamp("2013-06-01T19:00:00Z".into()))
        );
        assert_eq!(fields.get("venueId"), Some(&FieldValue::Integer(77)));
    }

    #[test]
    fn variants_declare_their_pair() {
        assert_eq!(active().state, RecordState::Active);
        assert_eq!(deleted().state, RecordState::Deleted);
        assert_eq!(deleted().endpoint, Endpoint::new("events"));
        assert!(deleted().post_save.is_some());
        assert!(active().post_save.is_none());
    }
}
