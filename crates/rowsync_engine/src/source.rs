//! Remote source abstraction for paginated fetches.

use crate::error::SourceError;
use parking_lot::Mutex;
use rowsync_model::{Cursor, Endpoint, RecordState, RemoteRecord};
use std::collections::HashMap;

/// One page of remote records.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// The records on this page, in remote order.
    pub records: Vec<RemoteRecord>,
    /// The cursor for the next page, or `None` when the source is exhausted.
    pub next_cursor: Option<Cursor>,
}

impl Page {
    /// Creates a page followed by more pages.
    pub fn new(records: Vec<RemoteRecord>, next_cursor: Cursor) -> Self {
        Self {
            records,
            next_cursor: Some(next_cursor),
        }
    }

    /// Creates the final page of a sequence.
    pub fn last(records: Vec<RemoteRecord>) -> Self {
        Self {
            records,
            next_cursor: None,
        }
    }
}

/// A remote source produces a lazy, finite, restartable sequence of records
/// for a given endpoint and state filter, via paginated requests.
///
/// This trait abstracts the webservice client, allowing different
/// implementations (HTTP, local snapshot, scripted for testing).
///
/// # Invariants
///
/// - Fetching the same cursor again yields the same records, so a resumed
///   run after a crash re-reads exactly what the crashed run saw
/// - `cursor == None` means "the first page"
pub trait RemoteSource: Send + Sync {
    /// Fetches one page for the pair, starting at `cursor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched or interpreted.
    fn fetch_page(
        &self,
        endpoint: &Endpoint,
        state: RecordState,
        cursor: Option<&Cursor>,
    ) -> Result<Page, SourceError>;
}

type PageKey = (String, String, Option<String>);

/// A scripted source for testing.
///
/// Pages are registered per (endpoint, state, cursor) and returned verbatim,
/// which makes the determinism invariant hold by construction. Fetches can
/// be made to fail at a chosen cursor, and every fetched cursor is recorded
/// so tests can assert where a resumed run started.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    pages: Mutex<HashMap<PageKey, Page>>,
    fail_at: Mutex<Option<Option<String>>>,
    fetched: Mutex<Vec<Option<String>>>,
}

impl ScriptedSource {
    /// Creates an empty scripted source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the page returned for a (endpoint, state, cursor) triple.
    pub fn set_page(
        &self,
        endpoint: &Endpoint,
        state: RecordState,
        cursor: Option<&str>,
        page: Page,
    ) {
        let key = (
            endpoint.as_str().to_string(),
            state.as_str().to_string(),
            cursor.map(str::to_string),
        );
        self.pages.lock().insert(key, page);
    }

    /// Makes the fetch at the given cursor fail (until cleared).
    pub fn set_fail_at(&self, cursor: Option<&str>) {
        *self.fail_at.lock() = Some(cursor.map(str::to_string));
    }

    /// Clears the injected fetch failure.
    pub fn clear_fail(&self) {
        *self.fail_at.lock() = None;
    }

    /// Returns the cursors fetched so far, in order.
    pub fn fetched(&self) -> Vec<Option<String>> {
        self.fetched.lock().clone()
    }
}

impl RemoteSource for ScriptedSource {
    fn fetch_page(
        &self,
        endpoint: &Endpoint,
        state: RecordState,
        cursor: Option<&Cursor>,
    ) -> Result<Page, SourceError> {
        let cursor_str = cursor.map(|c| c.as_str().to_string());
        self.fetched.lock().push(cursor_str.clone());

        if self.fail_at.lock().as_ref() == Some(&cursor_str) {
            return Err(SourceError::fetch(format!(
                "injected fetch failure at cursor {cursor_str:?}"
            )));
        }

        let key = (
            endpoint.as_str().to_string(),
            state.as_str().to_string(),
            cursor_str,
        );
        self.pages
            .lock()
            .get(&key)
            .cloned()
            .ok_or_else(|| SourceError::fetch(format!("no scripted page for {key:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: i64) -> RemoteRecord {
        RemoteRecord::from_value(json!({"id": id})).unwrap()
    }

    #[test]
    fn scripted_pages_are_deterministic() {
        let source = ScriptedSource::new();
        let endpoint = Endpoint::new("events");
        source.set_page(
            &endpoint,
            RecordState::Active,
            None,
            Page::new(vec![record(1)], Cursor::new("2")),
        );

        let first = source
            .fetch_page(&endpoint, RecordState::Active, None)
            .unwrap();
        let again = source
            .fetch_page(&endpoint, RecordState::Active, None)
            .unwrap();
        assert_eq!(first.records, again.records);
        assert_eq!(source.fetched(), vec![None, None]);
    }

    #[test]
    fn missing_page_is_a_fetch_error() {
        let source = ScriptedSource::new();
        let result = source.fetch_page(&Endpoint::new("events"), RecordState::Active, None);
        assert!(matches!(result, Err(SourceError::Fetch(_))));
    }

    #[test]
    fn injected_failure_at_cursor() {
        let source = ScriptedSource::new();
        let endpoint = Endpoint::new("events");
        source.set_page(
            &endpoint,
            RecordState::Active,
            Some("2"),
            Page::last(vec![]),
        );

        source.set_fail_at(Some("2"));
        let cursor = Cursor::new("2");
        assert!(source
            .fetch_page(&endpoint, RecordState::Active, Some(&cursor))
            .is_err());

        source.clear_fail();
        assert!(source
            .fetch_page(&endpoint, RecordState::Active, Some(&cursor))
            .is_ok());
    }
}
