//! A remote source backed by a local JSON snapshot.
//!
//! The snapshot document maps endpoint name to state name to an array of
//! pages, each page an array of record objects:
//!
//! ```json
//! {
//!   "events": {
//!     "deleted": [
//!       [ {"id": 42, "merged_into": null, "deleted_at": "2013-05-01"} ]
//!     ]
//!   }
//! }
//! ```
//!
//! Cursors are page indices rendered as strings, so retrying a cursor is
//! deterministic by construction. This source backs the CLI and doubles as
//! a fixture format for integration tests.

use crate::error::SourceError;
use crate::source::{Page, RemoteSource};
use rowsync_model::{Cursor, Endpoint, RecordState, RemoteRecord};
use std::collections::HashMap;
use std::path::Path;

/// A deterministic, finite source read from a JSON snapshot document.
pub struct SnapshotSource {
    pages: HashMap<(String, String), Vec<Vec<RemoteRecord>>>,
}

impl SnapshotSource {
    /// Builds a source from a parsed snapshot document.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Malformed`] if the document does not follow
    /// the endpoint-to-state-to-pages shape.
    pub fn from_value(document: serde_json::Value) -> Result<Self, SourceError> {
        let endpoints = document
            .as_object()
            .ok_or_else(|| SourceError::malformed("snapshot root must be an object"))?;

        let mut pages = HashMap::new();
        for (endpoint, states) in endpoints {
            let states = states.as_object().ok_or_else(|| {
                SourceError::malformed(format!("endpoint `{endpoint}` must map states to pages"))
            })?;

            for (state, page_list) in states {
                let page_list = page_list.as_array().ok_or_else(|| {
                    SourceError::malformed(format!("`{endpoint}.{state}` must be an array of pages"))
                })?;

                let mut parsed_pages = Vec::with_capacity(page_list.len());
                for (index, page) in page_list.iter().enumerate() {
                    let records = page.as_array().ok_or_else(|| {
                        SourceError::malformed(format!(
                            "`{endpoint}.{state}` page {index} must be an array of records"
                        ))
                    })?;
                    let records = records
                        .iter()
                        .map(|value| RemoteRecord::from_value(value.clone()))
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|e| {
                            SourceError::malformed(format!(
                                "`{endpoint}.{state}` page {index}: {e}"
                            ))
                        })?;
                    parsed_pages.push(records);
                }

                pages.insert((endpoint.clone(), state.clone()), parsed_pages);
            }
        }

        Ok(Self { pages })
    }

    /// Reads and parses a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let bytes = std::fs::read(path)?;
        let document: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| SourceError::malformed(e.to_string()))?;
        Self::from_value(document)
    }

    /// Returns the number of pages recorded for a pair.
    pub fn page_count(&self, endpoint: &Endpoint, state: RecordState) -> usize {
        self.pages
            .get(&(endpoint.as_str().to_string(), state.as_str().to_string()))
            .map_or(0, Vec::len)
    }
}

impl RemoteSource for SnapshotSource {
    fn fetch_page(
        &self,
        endpoint: &Endpoint,
        state: RecordState,
        cursor: Option<&Cursor>,
    ) -> Result<Page, SourceError> {
        let index = match cursor {
            None => 0,
            Some(cursor) => cursor.as_str().parse::<usize>().map_err(|_| {
                SourceError::malformed(format!("snapshot cursor `{cursor}` is not a page index"))
            })?,
        };

        let key = (endpoint.as_str().to_string(), state.as_str().to_string());
        let pages = match self.pages.get(&key) {
            Some(pages) => pages,
            // A pair absent from the snapshot reads as an empty source.
            None => return Ok(Page::last(Vec::new())),
        };

        let records = pages.get(index).cloned().unwrap_or_default();
        let next_cursor = if index + 1 < pages.len() {
            Some(Cursor::new((index + 1).to_string()))
        } else {
            None
        };

        Ok(Page {
            records,
            next_cursor,
        })
    }
}
