//! Built-in loader variants for the TicketEvolution-style catalog.
//!
//! Each endpoint contributes an `active` and a `deleted` variant. The
//! active variants upsert current remote data; the deleted variants mark
//! the local row inactive, stamp the deletion time, and cascade the soft
//! delete to dependent tables through the table store.

use crate::error::HookError;
use crate::loader::HookContext;
use crate::progress::RecordAction;

pub mod events;
pub mod performers;

/// The event-to-performer join table, a dependent of both parents.
pub const EVENT_PERFORMERS_TABLE: &str = "tevoEventPerformers";

/// The join table's status column.
pub const EVENT_PERFORMERS_STATUS_COLUMN: &str = "eventPerformersStatus";

/// Post-save hook for deleted variants: cascades the soft delete.
///
/// The row was just persisted as inactive; this asks the table store to run
/// its cascading delete so dependent rows go inactive with it. A failure
/// here is fatal to the run.
pub(crate) fn cascade_delete(ctx: &mut HookContext<'_>) -> Result<(), HookError> {
    ctx.table.delete(ctx.row.key)?;
    ctx.progress
        .record(ctx.endpoint, ctx.row.key, RecordAction::Cascaded);
    Ok(())
}
