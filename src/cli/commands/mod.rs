//! Command implementations.

pub mod add;
pub mod browse;
pub mod completions;
pub mod config;
pub mod sync;
pub mod transfer;
pub mod version;

use std::future::Future;

use crate::config::{resolve, Overrides, ResolvedConfig};
use crate::error::{Error, Result};
use crate::remote::HttpRemote;
use crate::storage::SqliteStore;
use crate::sync::SyncOrchestrator;

/// The orchestrator as the CLI wires it: SQLite store, HTTP remote.
pub type Library = SyncOrchestrator<SqliteStore, HttpRemote>;

/// Resolve configuration and open the quote library.
pub(crate) fn open_library(overrides: &Overrides<'_>) -> Result<(ResolvedConfig, Library)> {
    let config = resolve(overrides)?;
    let store = SqliteStore::open(&config.db_path)?;
    let remote = HttpRemote::with_config(&config.remote_url, config.request_timeout());
    let library = SyncOrchestrator::open(store, remote)?;
    Ok((config, library))
}

/// Drive a future to completion on a fresh runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;
    Ok(rt.block_on(future))
}

/// Print a serializable value as one JSON line.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
