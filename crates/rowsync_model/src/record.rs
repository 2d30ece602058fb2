//! The opaque remote record and its typed accessors.

use crate::error::{FieldError, ModelResult};
use crate::fields::FieldValue;
use serde::{Deserialize, Serialize};

/// One structured record fetched from the remote source.
///
/// A record is an immutable JSON object; which fields are consumed is
/// declared per loader variant through the typed accessors. Accessor
/// failures surface as [`FieldError`] so the loader can isolate a bad
/// record without aborting the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteRecord(serde_json::Map<String, serde_json::Value>);

impl RemoteRecord {
    /// Wraps a JSON object as a remote record.
    pub fn new(object: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(object)
    }

    /// Converts an arbitrary JSON value into a record.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::NotAnObject`] for non-object payloads.
    pub fn from_value(value: serde_json::Value) -> ModelResult<Self> {
        match value {
            serde_json::Value::Object(map) => Ok(Self(map)),
            other => Err(FieldError::NotAnObject(other.to_string())),
        }
    }

    /// Returns the raw JSON value of a field, if present.
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    /// Reads a required integer field.
    pub fn require_i64(&self, name: &str) -> ModelResult<i64> {
        self.get(name)
            .ok_or_else(|| FieldError::missing(name))?
            .as_i64()
            .ok_or_else(|| FieldError::wrong_type(name, "integer"))
    }

    /// Reads a required string field.
    pub fn require_str(&self, name: &str) -> ModelResult<&str> {
        self.get(name)
            .ok_or_else(|| FieldError::missing(name))?
            .as_str()
            .ok_or_else(|| FieldError::wrong_type(name, "string"))
    }

    /// Reads an optional integer field; absent and null both read as `None`.
    pub fn opt_i64(&self, name: &str) -> ModelResult<Option<i64>> {
        match self.get(name) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| FieldError::wrong_type(name, "integer")),
        }
    }

    /// Reads an optional string field; absent and null both read as `None`.
    pub fn opt_str(&self, name: &str) -> ModelResult<Option<&str>> {
        match self.get(name) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| FieldError::wrong_type(name, "string")),
        }
    }

    /// Carries a field through without pinning its type.
    ///
    /// Absent fields read as [`FieldValue::Null`].
    pub fn pass_through(&self, name: &str) -> FieldValue {
        match self.get(name) {
            Some(value) => FieldValue::from_json(value),
            None => FieldValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RemoteRecord {
        RemoteRecord::from_value(value).unwrap()
    }

    #[test]
    fn require_present_fields() {
        let r = record(json!({"id": 42, "deleted_at": "2013-05-01"}));

        assert_eq!(r.require_i64("id").unwrap(), 42);
        assert_eq!(r.require_str("deleted_at").unwrap(), "2013-05-01");
    }

    #[test]
    fn require_missing_field_fails() {
        let r = record(json!({"id": 42}));

        let err = r.require_str("deleted_at").unwrap_err();
        assert_eq!(err, FieldError::missing("deleted_at"));
    }

    #[test]
    fn require_wrong_type_fails() {
        let r = record(json!({"id": "not-a-number"}));

        let err = r.require_i64("id").unwrap_err();
        assert!(matches!(err, FieldError::WrongType { .. }));
    }

    #[test]
    fn optional_fields_treat_null_as_absent() {
        let r = record(json!({"merged_into": null}));

        assert_eq!(r.opt_i64("merged_into").unwrap(), None);
        assert_eq!(r.opt_i64("not_there").unwrap(), None);
    }

    #[test]
    fn pass_through_preserves_shape() {
        let r = record(json!({"merged_into": 7, "note": "x", "gone": null}));

        assert_eq!(r.pass_through("merged_into"), FieldValue::Integer(7));
        assert_eq!(r.pass_through("note"), FieldValue::Text("x".into()));
        assert_eq!(r.pass_through("gone"), FieldValue::Null);
        assert_eq!(r.pass_through("absent"), FieldValue::Null);
    }

    #[test]
    fn non_object_payload_rejected() {
        let err = RemoteRecord::from_value(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, FieldError::NotAnObject(_)));
    }
}
