//! Binary entry point: parse arguments, resolve configuration, open the
//! store and dispatch the subcommand.
mod commands;
mod ingest;


use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use crate::args::ApiwatchArgs;
use crate::config::MonitorConfig;
use crate::error::AppResult;
use crate::store::{MemoryStore, SqliteStore};

pub use ingest::{IngestSummary, ingest_lines};

/// Parse the process arguments and run the selected command.
///
/// # Errors
///
/// Returns configuration, store, and command failures.
pub fn run() -> AppResult<()> {
    let args = ApiwatchArgs::parse();
    crate::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

async fn run_async(args: ApiwatchArgs) -> AppResult<()> {
    let mut config = MonitorConfig::resolve(args.config.as_deref())?;
    if let Some(db) = args.db {
        config.db_path = Some(db);
    }

    match config.db_path.clone() {
        Some(path) => {
            info!("Using SQLite store at {}", path.display());
            let store = Arc::new(SqliteStore::open(&path).await?);
            commands::execute(store, config, args.command).await
        }
        None => {
            warn!("No database configured; records live in memory for this run only");
            commands::execute(Arc::new(MemoryStore::new()), config, args.command).await
        }
    }
}
