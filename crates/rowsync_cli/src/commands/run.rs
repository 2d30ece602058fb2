//! Run command implementation.

use super::{open_status, variant_for, Tables};
use rowsync_engine::{
    ConsoleProgress, DataLoader, LoaderConfig, SnapshotSource, SyncStatusTracker,
};
use rowsync_model::RecordState;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// Runs the run command.
pub fn run(
    data: &Path,
    snapshot: &Path,
    endpoint: &str,
    state: &str,
    fresh: bool,
    max_pages: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = RecordState::from_str(state)?;
    let variant = variant_for(endpoint, state)
        .ok_or_else(|| format!("no loader variant for endpoint `{endpoint}`"))?;

    let tables = Tables::open(data)?;
    let table = tables
        .for_endpoint(endpoint)
        .ok_or_else(|| format!("no table for endpoint `{endpoint}`"))?;
    let status = Arc::new(open_status(data)?);
    let source = Arc::new(SnapshotSource::from_path(snapshot)?);

    let mut config = LoaderConfig::new();
    if fresh {
        config = config.with_fresh_start();
    }
    if let Some(max_pages) = max_pages {
        config = config.with_max_pages(max_pages);
    }

    info!(
        endpoint,
        state = %state,
        snapshot = %snapshot.display(),
        fresh,
        "starting sync run"
    );
    println!("Syncing {endpoint} ({state}) from {}", snapshot.display());
    println!();

    let tracker = SyncStatusTracker::new(status, variant.endpoint.clone(), variant.state);
    let loader = DataLoader::new(
        variant,
        config,
        source,
        table,
        tracker,
        Arc::new(ConsoleProgress::new()),
    );
    let result = loader.run()?;
    info!(
        endpoint,
        outcome = %result.outcome,
        seen = result.seen,
        failed = result.failed(),
        "sync run finished"
    );

    println!();
    println!("Outcome:   {}", result.outcome);
    println!("Pages:     {}", result.pages);
    println!("Seen:      {}", result.seen);
    println!("Succeeded: {}", result.succeeded);
    println!("Skipped:   {}", result.skipped);
    println!("Failed:    {}", result.failed());
    for failure in &result.failures {
        match failure.key {
            Some(key) => println!("  {} (key {key}): {}", failure.stage, failure.message),
            None => println!("  {}: {}", failure.stage, failure.message),
        }
    }

    Ok(())
}
