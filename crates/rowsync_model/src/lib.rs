//! # rowsync Model
//!
//! Shared data model for the rowsync record cache.
//!
//! This crate defines the value types exchanged between the remote source,
//! the loader engine, and the local stores:
//! - [`RemoteRecord`] - an opaque structured record fetched from the remote API
//! - [`FieldValue`] / [`MappedFields`] - the typed column mapping produced by
//!   a loader variant's format step
//! - [`Row`] - the local projection of one remote record, keyed by natural key
//! - [`SyncStatus`] and friends - per-(endpoint, state) sync bookkeeping
//!
//! ## Key Invariants
//!
//! - A [`Row`]'s natural key never changes across runs
//! - [`RemoteRecord`] is immutable once fetched
//! - [`MappedFields`] keys are unique; insertion order is irrelevant

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod fields;
mod record;
mod row;
mod status;

pub use error::{FieldError, ModelResult};
pub use fields::{FieldValue, MappedFields};
pub use record::RemoteRecord;
pub use row::{RecordKey, Row};
pub use status::{Cursor, Endpoint, RecordState, RunOutcome, SyncStatus};
