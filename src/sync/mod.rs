//! Reconciliation with the remote source, plus import/export.
//!
//! - **Merge**: pure reconciliation of local and remote collections
//! - **Orchestrator**: fetch → reconcile → persist → reindex → notify
//! - **Export**: collection → self-describing JSON document
//! - **Import**: JSON / JSONL → validated quotes (additive)
//! - **Hashing**: SHA256 content hash embedded in exports
//!
//! # Example
//!
//! ```ignore
//! use qb::remote::HttpRemote;
//! use qb::storage::SqliteStore;
//! use qb::sync::{ManualSync, SyncOrchestrator};
//!
//! let store = SqliteStore::open(&db_path)?;
//! let orchestrator = SyncOrchestrator::open(store, HttpRemote::new(url))?;
//!
//! if let ManualSync::Ran(report) = orchestrator.on_manual_sync().await {
//!     println!("{:?}: {} added", report.outcome, report.stats.added);
//! }
//! ```

mod export;
mod file;
mod hash;
mod import;
mod merge;
mod orchestrator;
mod types;

pub use export::{export_collection, export_document, DEFAULT_EXPORT_FILE};
pub use file::atomic_write;
pub use hash::content_hash;
pub use import::{parse_import, ParsedImport};
pub use merge::{reconcile, reconcile_with_snapshot};
pub use orchestrator::SyncOrchestrator;
pub use types::{
    AddOutcome, CategoryConflict, ConflictKind, ExportDocument, ImportReport, ManualSync,
    MergeOutcome, MergeStats, SyncOutcome, SyncReport, EXPORT_FORMAT, EXPORT_VERSION,
};
