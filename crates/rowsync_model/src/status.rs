//! Per-(endpoint, state) sync status bookkeeping types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named remote resource category (e.g. `events`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    /// Creates an endpoint name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the endpoint name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Endpoint {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The lifecycle filter applied to an endpoint's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordState {
    /// Records currently live on the remote.
    Active,
    /// Records the remote has soft-deleted.
    Deleted,
}

impl RecordState {
    /// Returns the canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordState::Active => "active",
            RecordState::Deleted => "deleted",
        }
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(RecordState::Active),
            "deleted" => Ok(RecordState::Deleted),
            other => Err(format!("unknown record state `{other}`")),
        }
    }
}

/// An opaque resume marker identifying the next page to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Creates a cursor from its opaque string form.
    pub fn new(marker: impl Into<String>) -> Self {
        Self(marker.into())
    }

    /// Returns the opaque marker.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The recorded outcome of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    /// Every record on every page was processed.
    Success,
    /// The run completed (or checkpointed) with some records failing.
    Partial,
    /// The run ended early, e.g. a page fetch failed.
    Failed,
}

impl RunOutcome {
    /// Returns the canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Success => "success",
            RunOutcome::Partial => "partial",
            RunOutcome::Failed => "failed",
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sync status entry per (endpoint, state) pair.
///
/// Created on the pair's first run, updated after every page and every run,
/// never deleted during normal operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    /// The endpoint this entry tracks.
    pub endpoint: Endpoint,
    /// The record-state filter this entry tracks.
    pub state: RecordState,
    /// Wall-clock time of the last update, milliseconds since the epoch.
    pub last_run_at_ms: i64,
    /// The last successfully checkpointed cursor, if any.
    pub cursor: Option<Cursor>,
    /// Outcome of the most recent run (or `Partial` while one is in flight).
    pub last_outcome: RunOutcome,
    /// Number of record-level failures recorded by the most recent run.
    pub error_count: u64,
}

impl SyncStatus {
    /// Creates a fresh entry for a pair's first run.
    pub fn new(endpoint: Endpoint, state: RecordState) -> Self {
        Self {
            endpoint,
            state,
            last_run_at_ms: 0,
            cursor: None,
            last_outcome: RunOutcome::Partial,
            error_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_state_round_trip() {
        assert_eq!("active".parse::<RecordState>().unwrap(), RecordState::Active);
        assert_eq!(
            "deleted".parse::<RecordState>().unwrap(),
            RecordState::Deleted
        );
        assert!("archived".parse::<RecordState>().is_err());
        assert_eq!(RecordState::Deleted.to_string(), "deleted");
    }

    #[test]
    fn status_serializes_with_lowercase_enums() {
        let status = SyncStatus {
            endpoint: Endpoint::new("events"),
            state: RecordState::Deleted,
            last_run_at_ms: 1,
            cursor: Some(Cursor::new("page-2")),
            last_outcome: RunOutcome::Success,
            error_count: 0,
        };

        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"deleted\""));
        assert!(json.contains("\"success\""));
        assert!(json.contains("page-2"));

        let back: SyncStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
    }
}
