//! The local row projection of one remote record.

use crate::fields::{FieldValue, MappedFields};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The natural key matching remote records to local rows.
///
/// This is the remote identifier, unique per endpoint/table.
pub type RecordKey = i64;

/// A mutable projection of one remote record into local storage fields.
///
/// A row is looked up (or created) at the start of processing one record,
/// mutated by the format step, persisted, then released. The loader never
/// retains rows across records, and a row's key never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// The natural key (remote identifier).
    pub key: RecordKey,
    /// The local column values.
    pub fields: BTreeMap<String, FieldValue>,
}

impl Row {
    /// Creates a new unsaved row for the given natural key.
    pub fn new(key: RecordKey) -> Self {
        Self {
            key,
            fields: BTreeMap::new(),
        }
    }

    /// Assigns mapped fields onto the row, overwriting matching columns.
    ///
    /// Columns not named in `fields` keep their current values, so audit
    /// fields written by earlier runs survive a partial update.
    pub fn assign(&mut self, fields: MappedFields) {
        for (name, value) in fields {
            self.fields.insert(name, value);
        }
    }

    /// Reads one column value.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Writes one column value.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_overlays_without_clearing() {
        let mut row = Row::new(42);
        row.set_field("deleted_at", FieldValue::Timestamp("2013-05-01".into()));

        row.assign(
            MappedFields::new()
                .with("eventsStatus", FieldValue::State(0))
                .with("eventId", 42i64),
        );

        assert_eq!(row.field("eventId"), Some(&FieldValue::Integer(42)));
        assert_eq!(row.field("eventsStatus"), Some(&FieldValue::State(0)));
        // Untouched column survives
        assert_eq!(
            row.field("deleted_at"),
            Some(&FieldValue::Timestamp("2013-05-01".into()))
        );
    }

    #[test]
    fn assign_is_idempotent() {
        let fields = MappedFields::new()
            .with("eventId", 42i64)
            .with("eventsStatus", FieldValue::State(0));

        let mut once = Row::new(42);
        once.assign(fields.clone());

        let mut twice = Row::new(42);
        twice.assign(fields.clone());
        twice.assign(fields);

        assert_eq!(once, twice);
    }
}
