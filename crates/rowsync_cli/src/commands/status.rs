//! Status command implementation.

use super::open_status;
use rowsync_store::StatusStore;
use std::path::Path;

/// Runs the status command.
pub fn run(data: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let status = open_status(data)?;
    let entries = status.all()?;

    if entries.is_empty() {
        println!("No sync runs recorded yet");
        return Ok(());
    }

    println!(
        "{:<14} {:<8} {:<8} {:<10} {:<8} last run (ms since epoch)",
        "endpoint", "state", "outcome", "cursor", "errors"
    );
    for entry in entries {
        let cursor = entry
            .cursor
            .as_ref()
            .map_or_else(|| "-".to_string(), |c| c.as_str().to_string());
        println!(
            "{:<14} {:<8} {:<8} {:<10} {:<8} {}",
            entry.endpoint,
            entry.state,
            entry.last_outcome,
            cursor,
            entry.error_count,
            entry.last_run_at_ms
        );
    }

    Ok(())
}
