//! Reset-cursor command implementation.

use super::open_status;
use rowsync_model::{Endpoint, RecordState};
use rowsync_store::StatusStore;
use std::path::Path;
use std::str::FromStr;

/// Runs the reset-cursor command.
pub fn run(data: &Path, endpoint: &str, state: &str) -> Result<(), Box<dyn std::error::Error>> {
    let state = RecordState::from_str(state)?;
    let endpoint = Endpoint::new(endpoint);

    let status = open_status(data)?;
    match status.get(&endpoint, state)? {
        Some(entry) => {
            status.remove(&endpoint, state)?;
            let cursor = entry
                .cursor
                .as_ref()
                .map_or("-", |c| c.as_str());
            println!("Cleared {endpoint} ({state}), cursor was {cursor}");
        }
        None => {
            println!("No sync status recorded for {endpoint} ({state})");
        }
    }

    Ok(())
}
