//! # rowsync Store
//!
//! Local persistence seams for the rowsync record cache.
//!
//! This crate provides:
//! - [`TableStore`] - the row-persistence capability the loader writes through
//! - [`StatusStore`] - the per-(endpoint, state) sync-status store
//! - In-memory implementations for tests and ephemeral runs
//! - JSON-file-backed implementations for the command-line tools
//!
//! ## Delete Semantics
//!
//! `TableStore::delete` is a **soft delete**: it flips the table's status
//! column to the inactive sentinel and cascades the same inactivation to
//! registered dependent tables. Rows are never physically removed, so audit
//! fields written before the delete survive it.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod status;
mod table;

pub use error::{StoreError, StoreResult};
pub use file::{FileStatusStore, FileTableStore};
pub use memory::{MemoryStatusStore, MemoryTableStore};
pub use status::StatusStore;
pub use table::{TableStore, INACTIVE, ACTIVE};
