//! rowsync CLI
//!
//! Command-line runner for syncing remote catalog snapshots into local
//! JSON-file tables.
//!
//! # Commands
//!
//! - `run` - Sync one (endpoint, state) pair from a snapshot file
//! - `status` - Show sync status for every tracked pair
//! - `reset-cursor` - Clear a pair's cursor so its next run starts over

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// rowsync command-line sync tools.
#[derive(Parser)]
#[command(name = "rowsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the data directory holding table and status files
    #[arg(global = true, short, long)]
    data: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync one (endpoint, state) pair from a snapshot file
    Run {
        /// Path to the JSON snapshot to sync from
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Endpoint to sync (events, performers)
        #[arg(short, long)]
        endpoint: String,

        /// Record state to sync (active, deleted)
        #[arg(long, default_value = "active")]
        state: String,

        /// Ignore the stored cursor and start from the beginning
        #[arg(short, long)]
        fresh: bool,

        /// Maximum number of pages to process
        #[arg(short, long)]
        max_pages: Option<u32>,
    },

    /// Show sync status for every tracked pair
    Status,

    /// Clear a pair's cursor so its next run starts over
    ResetCursor {
        /// Endpoint to reset
        #[arg(short, long)]
        endpoint: String,

        /// Record state to reset (active, deleted)
        #[arg(long, default_value = "active")]
        state: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Run {
            snapshot,
            endpoint,
            state,
            fresh,
            max_pages,
        } => {
            let data = cli.data.ok_or("Data directory required for run")?;
            commands::run::run(&data, &snapshot, &endpoint, &state, fresh, max_pages)?;
        }
        Commands::Status => {
            let data = cli.data.ok_or("Data directory required for status")?;
            commands::status::run(&data)?;
        }
        Commands::ResetCursor { endpoint, state } => {
            let data = cli.data.ok_or("Data directory required for reset-cursor")?;
            commands::reset::run(&data, &endpoint, &state)?;
        }
    }

    Ok(())
}
