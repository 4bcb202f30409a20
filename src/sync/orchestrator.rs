//! Sync orchestration: fetch → reconcile → persist → reindex → notify.
//!
//! The orchestrator owns the in-memory library (collection, category index,
//! filter selection, last sync snapshot) together with the store it is
//! persisted through. Two locks keep it consistent:
//!
//! - the *cycle guard* admits one sync cycle at a time; manual triggers
//!   that find it taken are dropped, scheduled ticks wait for it
//! - the *state lock* covers reconcile, persist and apply, never the
//!   network fetch, so local edits are not blocked by a slow remote
//!
//! Every edit (a sync merge, an add, an import) starts from the collection
//! the store holds at that moment, read and rewritten in one
//! [`QuoteStore::update`], so quotes written by another process sharing the
//! store are never dropped. The in-memory copy only serves reads and is
//! replaced after the store accepted the result. A failed fetch or a failed
//! save leaves everything as it was.
//!
//! An unchanged cycle writes nothing. The remote it saw is kept in memory
//! as the snapshot and reaches the store with the next updating cycle.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::index::{apply_filter, reindex, CategoryIndex, FilterSelection};
use crate::model::{default_quotes, Collection, Quote};
use crate::remote::RemoteSource;
use crate::storage::QuoteStore;
use crate::sync::export::export_collection;
use crate::sync::import::parse_import;
use crate::sync::merge::reconcile_with_snapshot;
use crate::sync::types::{AddOutcome, ImportReport, ManualSync, SyncReport};

/// Buffered reports per subscriber before the slowest one starts lagging.
const REPORT_CHANNEL_CAPACITY: usize = 16;

/// In-memory state plus the store it mirrors.
struct Library<S> {
    store: S,
    quotes: Collection,
    index: CategoryIndex,
    selection: FilterSelection,
    snapshot: Option<Collection>,
}

impl<S: QuoteStore> Library<S> {
    /// Swap in a collection the store already holds and refresh the
    /// derived state.
    fn apply(&mut self, quotes: Collection) {
        self.index = reindex(&quotes);
        self.selection = std::mem::take(&mut self.selection).resolve(&self.index);
        self.quotes = quotes;
    }

    /// Read the stored collection (seeding defaults if nothing was ever
    /// saved), let `edit` grow it, and write it back atomically. Memory is
    /// refreshed only once the write succeeded.
    fn grow<F>(&mut self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Collection),
    {
        let grown = self.store.update(|stored| {
            let mut grown = stored.unwrap_or_else(default_quotes);
            edit(&mut grown);
            (Some(grown.clone()), grown)
        })?;
        self.apply(grown);
        Ok(())
    }

    /// Persist the remote collection of an updating cycle.
    fn persist_snapshot(&mut self, cycle_id: &str, remote: Collection) {
        if let Err(e) = self.store.save_snapshot(&remote) {
            warn!(cycle_id = %cycle_id, error = %e, "Failed to record sync snapshot");
        }
        self.snapshot = Some(remote);
    }
}

/// Drives reconciliation between the local store and a remote source.
pub struct SyncOrchestrator<S, R> {
    state: Mutex<Library<S>>,
    cycle_guard: Mutex<()>,
    remote: R,
    reports: broadcast::Sender<SyncReport>,
}

impl<S: QuoteStore, R: RemoteSource> SyncOrchestrator<S, R> {
    /// Load the library from `store` and wire it to `remote`.
    ///
    /// A store that never saved anything yields the default seed quotes.
    /// A persisted selection naming a category that no longer exists
    /// resolves to "all".
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read. Unreadable persisted
    /// content (parse errors) falls back to the seed set instead.
    pub fn open(store: S, remote: R) -> Result<Self> {
        let quotes = match store.load() {
            Ok(Some(quotes)) => quotes,
            Ok(None) => default_quotes(),
            Err(e @ (Error::Parse { .. } | Error::Json(_))) => {
                warn!(error = %e, "Stored quotes are unreadable, starting from defaults");
                default_quotes()
            }
            Err(e) => return Err(e),
        };

        let index = reindex(&quotes);
        let selection = store
            .load_selection()?
            .and_then(|raw| raw.parse::<FilterSelection>().ok())
            .unwrap_or_default()
            .resolve(&index);
        let snapshot = store.load_snapshot()?;

        debug!(
            quotes = quotes.len(),
            categories = index.len(),
            selection = %selection,
            "Opened quote library"
        );

        let (reports, _) = broadcast::channel(REPORT_CHANNEL_CAPACITY);
        Ok(Self {
            state: Mutex::new(Library {
                store,
                quotes,
                index,
                selection,
                snapshot,
            }),
            cycle_guard: Mutex::new(()),
            remote,
            reports,
        })
    }

    /// Receive every report produced from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncReport> {
        self.reports.subscribe()
    }

    /// Run one sync cycle, waiting for an in-flight cycle to finish first.
    pub async fn run_sync_cycle(&self) -> SyncReport {
        let _cycle = self.cycle_guard.lock().await;
        self.run_cycle().await
    }

    /// Run a cycle on user request, unless one is already in flight.
    pub async fn on_manual_sync(&self) -> ManualSync {
        let Ok(_cycle) = self.cycle_guard.try_lock() else {
            info!("Sync already in progress, dropping manual trigger");
            return ManualSync::Dropped;
        };
        ManualSync::Ran(self.run_cycle().await)
    }

    /// Alias of [`Self::on_manual_sync`].
    pub async fn trigger_manual_sync(&self) -> ManualSync {
        self.on_manual_sync().await
    }

    /// Run a cycle every `interval` until `shutdown` resolves.
    ///
    /// The first cycle runs immediately. Ticks missed while a slow cycle
    /// was running are skipped rather than replayed.
    pub async fn run_periodic<F>(&self, interval: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(interval_secs = interval.as_secs_f64(), "Periodic sync started");
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => {
                    let report = self.run_sync_cycle().await;
                    debug!(cycle_id = %report.cycle_id, outcome = ?report.outcome, "Periodic cycle finished");
                }
            }
        }
        info!("Periodic sync stopped");
    }

    /// Body of a cycle. The caller holds the cycle guard.
    async fn run_cycle(&self) -> SyncReport {
        let cycle_id = new_cycle_id();
        debug!(cycle_id = %cycle_id, "Fetching remote quotes");

        let report = match self.remote.fetch_quotes().await {
            Ok(remote) => self.apply_remote(cycle_id, remote).await,
            Err(e) => {
                warn!(cycle_id = %cycle_id, error = %e, "Remote fetch failed, local data untouched");
                SyncReport::failed(cycle_id, e.to_string())
            }
        };

        // No subscribers is not an error.
        let _ = self.reports.send(report.clone());
        report
    }

    async fn apply_remote(&self, cycle_id: String, remote: Collection) -> SyncReport {
        let mut guard = self.state.lock().await;
        let library = &mut *guard;
        let snapshot = library.snapshot.as_deref();

        let merged = library.store.update(|stored| {
            let current = stored.unwrap_or_else(default_quotes);
            let outcome = reconcile_with_snapshot(&current, &remote, snapshot);
            let replacement = outcome.changed.then(|| outcome.merged.clone());
            (replacement, (current, outcome))
        });
        let (current, outcome) = match merged {
            Ok(merged) => merged,
            Err(e) => {
                warn!(cycle_id = %cycle_id, error = %e, "Failed to persist merged quotes, keeping previous collection");
                return SyncReport::failed(cycle_id, format!("failed to persist merged quotes: {e}"));
            }
        };

        for conflict in &outcome.conflicts {
            debug!(
                cycle_id = %cycle_id,
                text = %conflict.text,
                local = %conflict.local_category,
                remote = %conflict.remote_category,
                kind = ?conflict.kind,
                "Category overwritten by remote"
            );
        }

        if !outcome.changed {
            library.apply(current);
            library.snapshot = Some(remote);
            info!(cycle_id = %cycle_id, remote = outcome.stats.total(), "Sync finished, nothing changed");
            return SyncReport::unchanged(cycle_id, outcome);
        }

        library.apply(outcome.merged.clone());
        library.persist_snapshot(&cycle_id, remote);

        info!(
            cycle_id = %cycle_id,
            added = outcome.stats.added,
            updated = outcome.stats.updated,
            conflicts = outcome.stats.conflicts,
            "Sync finished, collection updated"
        );
        SyncReport::updated(cycle_id, outcome)
    }

    /// Add a quote locally, then post it to the remote.
    ///
    /// The post is best effort: its failure is logged and reported through
    /// [`AddOutcome::posted`], the local add stands.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for empty fields, or the store error if
    /// the grown collection could not be saved (memory is then unchanged).
    pub async fn on_add_quote(&self, text: &str, category: &str) -> Result<AddOutcome> {
        let quote = self.add_local(text, category).await?;

        let posted = match self.remote.post_quote(&quote).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to post quote to remote, kept locally");
                false
            }
        };

        Ok(AddOutcome { quote, posted })
    }

    /// Add a quote to the local collection without contacting the remote.
    ///
    /// # Errors
    ///
    /// Same as [`Self::on_add_quote`].
    pub async fn add_local(&self, text: &str, category: &str) -> Result<Quote> {
        let quote = Quote::new(text, category)?;

        let mut library = self.state.lock().await;
        library.grow(|quotes| quotes.push(quote.clone()))?;

        info!(category = %quote.category(), "Added quote");
        Ok(quote)
    }

    /// Change the filter selection and persist it.
    ///
    /// Returns the effective selection: a category missing from the index
    /// resolves to "all".
    ///
    /// # Errors
    ///
    /// Returns the store error if the selection could not be persisted.
    pub async fn on_filter_changed(&self, selection: FilterSelection) -> Result<FilterSelection> {
        let mut library = self.state.lock().await;
        let resolved = selection.resolve(&library.index);
        library.store.save_selection(&resolved.to_string())?;
        library.selection = resolved.clone();
        debug!(selection = %resolved, "Filter selection changed");
        Ok(resolved)
    }

    /// Append the valid records of an import stream.
    ///
    /// Import never deduplicates and never touches categories of existing
    /// quotes. A stream with no valid records leaves the store untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for unreadable streams, or the store error
    /// if the grown collection could not be saved.
    pub async fn import_bytes(&self, source_name: &str, bytes: &[u8]) -> Result<ImportReport> {
        let parsed = parse_import(source_name, bytes)?;
        let report = ImportReport {
            added: parsed.quotes.len(),
            skipped: parsed.skipped,
            hash_mismatch: parsed.hash_mismatch,
        };

        if !parsed.quotes.is_empty() {
            let mut library = self.state.lock().await;
            library.grow(|quotes| quotes.extend(parsed.quotes))?;
        }

        info!(
            source = source_name,
            added = report.added,
            skipped = report.skipped,
            "Import finished"
        );
        Ok(report)
    }

    /// Serialize the whole collection as an export document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub async fn export_bytes(&self) -> Result<Vec<u8>> {
        let library = self.state.lock().await;
        export_collection(&library.quotes)
    }

    /// Copy of the current collection.
    pub async fn quotes(&self) -> Collection {
        self.state.lock().await.quotes.clone()
    }

    pub async fn categories(&self) -> CategoryIndex {
        self.state.lock().await.index.clone()
    }

    pub async fn selection(&self) -> FilterSelection {
        self.state.lock().await.selection.clone()
    }

    /// Quotes matching the current selection, in collection order.
    pub async fn filtered_quotes(&self) -> Vec<Quote> {
        let library = self.state.lock().await;
        apply_filter(&library.quotes, &library.selection)
    }

    /// Pick a quote from the filtered view.
    ///
    /// `pick` receives the number of candidates and returns an index; out
    /// of range values wrap. Returns `None` when nothing matches.
    pub async fn random_quote<P>(&self, pick: P) -> Option<Quote>
    where
        P: FnOnce(usize) -> usize,
    {
        let mut candidates = self.filtered_quotes().await;
        if candidates.is_empty() {
            return None;
        }
        let index = pick(candidates.len()) % candidates.len();
        Some(candidates.swap_remove(index))
    }
}

fn new_cycle_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("sync_{}", &id[..12])
}
