//! Typed field values and the mapped-fields intermediate representation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A typed value destined for one local column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    /// A signed integer column value.
    Integer(i64),
    /// A text column value.
    Text(String),
    /// A timestamp, carried as the remote's string representation.
    Timestamp(String),
    /// An enum-like state flag (e.g. 0 = inactive, 1 = active).
    State(i64),
    /// An explicit NULL.
    Null,
}

impl FieldValue {
    /// Returns the integer content of `Integer` or `State` values.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) | FieldValue::State(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string content of `Text` or `Timestamp` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Timestamp(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true for the explicit NULL value.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Converts a raw JSON value into a field value, preserving its shape.
    ///
    /// Used for pass-through columns whose remote type is not pinned down
    /// (e.g. a merge-target identifier that is an integer or null).
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::State(i64::from(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Text(n.to_string()),
            },
            serde_json::Value::String(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Text(other.to_string()),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// The intermediate mapping from local column name to typed value.
///
/// Produced by a loader variant's format step and assigned onto a
/// [`crate::Row`] before persistence. Keys are unique; insertion order
/// is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedFields(BTreeMap<String, FieldValue>);

impl MappedFields {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a column value, replacing any previous value for the name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Looks up a column value by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Returns the number of mapped columns.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no columns are mapped.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    /// Consumes the mapping, yielding the underlying column map.
    pub fn into_inner(self) -> BTreeMap<String, FieldValue> {
        self.0
    }
}

impl IntoIterator for MappedFields {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, FieldValue)> for MappedFields {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
