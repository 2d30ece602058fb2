//! Progress output sinks.
//!
//! Progress is a human-readable side channel, never parsed programmatically.
//! The sink is injected so tests run silent ([`NullProgress`]) and the CLI
//! prints line-oriented messages ([`ConsoleProgress`]).

use parking_lot::Mutex;
use rowsync_model::{Endpoint, RecordKey, RecordState};
use std::fmt;

/// What happened to one processed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    /// A new local row was created.
    Created,
    /// An existing local row was updated.
    Updated,
    /// The record was skipped (e.g. deleted remotely, absent locally).
    Skipped,
    /// The row's soft delete was cascaded to its dependents.
    Cascaded,
}

impl fmt::Display for RecordAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordAction::Created => "created",
            RecordAction::Updated => "updated",
            RecordAction::Skipped => "skipped",
            RecordAction::Cascaded => "cascaded",
        };
        f.write_str(name)
    }
}

/// A sink for per-record and per-page progress messages.
pub trait ProgressSink: Send + Sync {
    /// Reports one successfully processed record.
    fn record(&self, endpoint: &Endpoint, key: RecordKey, action: RecordAction);

    /// Reports one failed record.
    fn failure(&self, endpoint: &Endpoint, key: Option<RecordKey>, message: &str);

    /// Reports a completed page.
    fn page(&self, endpoint: &Endpoint, state: RecordState, pages: u32, seen: u64);
}

/// A sink that discards everything. Used in tests and embedded runs.
#[derive(Debug, Default)]
pub struct NullProgress;

impl NullProgress {
    /// Creates a no-op sink.
    pub fn new() -> Self {
        Self
    }
}

impl ProgressSink for NullProgress {
    fn record(&self, _endpoint: &Endpoint, _key: RecordKey, _action: RecordAction) {}

    fn failure(&self, _endpoint: &Endpoint, _key: Option<RecordKey>, _message: &str) {}

    fn page(&self, _endpoint: &Endpoint, _state: RecordState, _pages: u32, _seen: u64) {}
}

/// A sink that prints line-oriented messages to stdout. Used by the CLI.
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl ConsoleProgress {
    /// Creates a console sink.
    pub fn new() -> Self {
        Self
    }
}

impl ProgressSink for ConsoleProgress {
    fn record(&self, endpoint: &Endpoint, key: RecordKey, action: RecordAction) {
        println!("{endpoint}: {action} {key}");
    }

    fn failure(&self, endpoint: &Endpoint, key: Option<RecordKey>, message: &str) {
        match key {
            Some(key) => println!("{endpoint}: FAILED {key}: {message}"),
            None => println!("{endpoint}: FAILED <no key>: {message}"),
        }
    }

    fn page(&self, endpoint: &Endpoint, state: RecordState, pages: u32, seen: u64) {
        println!("{endpoint} ({state}): page {pages} done, {seen} records seen");
    }
}

/// A sink that collects formatted lines in memory, for tests.
#[derive(Debug, Default)]
pub struct MemoryProgress {
    lines: Mutex<Vec<String>>,
}

impl MemoryProgress {
    /// Creates an empty collecting sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected lines.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl ProgressSink for MemoryProgress {
    fn record(&self, endpoint: &Endpoint, key: RecordKey, action: RecordAction) {
        self.lines.lock().push(format!("{endpoint}: {action} {key}"));
    }

    fn failure(&self, endpoint: &Endpoint, key: Option<RecordKey>, message: &str) {
        let key = key.map_or_else(|| "<no key>".to_string(), |k| k.to_string());
        self.lines
            .lock()
            .push(format!("{endpoint}: FAILED {key}: {message}"));
    }

    fn page(&self, endpoint: &Endpoint, state: RecordState, pages: u32, seen: u64) {
        self.lines
            .lock()
            .push(format!("{endpoint} ({state}): page {pages}, seen {seen}"));
    }
}
