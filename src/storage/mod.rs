//! Local persistence for Quotebook.
//!
//! The sync core only sees the [`QuoteStore`] trait. Two adapters ship
//! with the crate:
//!
//! - [`sqlite`] - durable SQLite store used by the CLI
//! - [`memory`] - in-process store for tests and embedding
//!
//! [`session`] holds the per-terminal "last viewed quote" cache, which is
//! not part of the store because it must not outlive the session.

pub mod memory;
pub mod schema;
pub mod session;
pub mod sqlite;

pub use memory::{MemoryStore, StoreStats};
pub use session::{LastViewed, SessionCache};
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::model::{Collection, Quote};

/// Durable storage for the quote collection and its companion state.
///
/// Calls are synchronous; the orchestrator serializes them.
pub trait QuoteStore: Send {
    /// Load the stored collection.
    ///
    /// Returns `None` if nothing was ever saved, so the caller can seed
    /// defaults. Records that fail validation are skipped.
    fn load(&self) -> Result<Option<Collection>>;

    /// Replace the stored collection, preserving order.
    fn save(&mut self, quotes: &[Quote]) -> Result<()>;

    /// Read the stored collection and replace it in one atomic step.
    ///
    /// `edit` receives what is stored right now (`None` if nothing was ever
    /// saved) and returns the replacement, or `None` to leave the store
    /// untouched, plus a value handed back to the caller. Writers in other
    /// processes cannot slip in between the read and the write.
    fn update<T, F>(&mut self, edit: F) -> Result<T>
    where
        F: FnOnce(Option<Collection>) -> (Option<Collection>, T);

    /// Load the persisted filter selection (`"all"` or a category).
    fn load_selection(&self) -> Result<Option<String>>;

    /// Persist the filter selection.
    fn save_selection(&mut self, selection: &str) -> Result<()>;

    /// Load the remote collection recorded by the last successful sync.
    fn load_snapshot(&self) -> Result<Option<Collection>>;

    /// Record the remote collection seen by a successful sync.
    fn save_snapshot(&mut self, quotes: &[Quote]) -> Result<()>;
}
