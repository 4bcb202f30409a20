//! In-memory [`QuoteStore`] for tests and embedding.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{Collection, Quote};
use crate::storage::QuoteStore;

/// Write counters shared with a [`MemoryStore`] after it has been moved
/// into an orchestrator.
#[derive(Debug, Default)]
pub struct StoreStats {
    saves: AtomicUsize,
    snapshot_saves: AtomicUsize,
    fail_save: AtomicBool,
}

impl StoreStats {
    /// Number of successful collection writes.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Number of sync snapshot writes.
    #[must_use]
    pub fn snapshot_saves(&self) -> usize {
        self.snapshot_saves.load(Ordering::SeqCst)
    }

    /// Total writes of any kind. Selection writes are not counted.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.saves() + self.snapshot_saves()
    }

    /// Make subsequent collection saves fail.
    pub fn set_fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }
}

/// Store that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    quotes: Option<Collection>,
    selection: Option<String>,
    snapshot: Option<Collection>,
    stats: Arc<StoreStats>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already saved collection.
    #[must_use]
    pub fn with_quotes(quotes: Collection) -> Self {
        Self {
            quotes: Some(quotes),
            ..Self::default()
        }
    }

    /// Handle for counting writes and injecting failures.
    #[must_use]
    pub fn stats(&self) -> Arc<StoreStats> {
        Arc::clone(&self.stats)
    }

    fn write_quotes(&mut self, quotes: Collection) -> Result<()> {
        if self.stats.fail_save.load(Ordering::SeqCst) {
            return Err(Error::Other("injected save failure".to_string()));
        }
        self.quotes = Some(quotes);
        self.stats.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl QuoteStore for MemoryStore {
    fn load(&self) -> Result<Option<Collection>> {
        Ok(self.quotes.clone())
    }

    fn save(&mut self, quotes: &[Quote]) -> Result<()> {
        self.write_quotes(quotes.to_vec())
    }

    fn update<T, F>(&mut self, edit: F) -> Result<T>
    where
        F: FnOnce(Option<Collection>) -> (Option<Collection>, T),
    {
        let (replacement, value) = edit(self.quotes.clone());
        if let Some(quotes) = replacement {
            self.write_quotes(quotes)?;
        }
        Ok(value)
    }

    fn load_selection(&self) -> Result<Option<String>> {
        Ok(self.selection.clone())
    }

    fn save_selection(&mut self, selection: &str) -> Result<()> {
        self.selection = Some(selection.to_string());
        Ok(())
    }

    fn load_snapshot(&self) -> Result<Option<Collection>> {
        Ok(self.snapshot.clone())
    }

    fn save_snapshot(&mut self, quotes: &[Quote]) -> Result<()> {
        self.snapshot = Some(quotes.to_vec());
        self.stats.snapshot_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(text: &str, category: &str) -> Quote {
        Quote::new(text, category).unwrap()
    }

    #[test]
    fn test_stats_count_saves() {
        let mut store = MemoryStore::new();
        let stats = store.stats();

        store.save(&[]).unwrap();
        assert_eq!(stats.saves(), 1);

        stats.set_fail_save(true);
        assert!(store.save(&[]).is_err());
        assert_eq!(stats.saves(), 1);

        store.save_snapshot(&[]).unwrap();
        assert_eq!(stats.snapshot_saves(), 1);
        assert_eq!(stats.writes(), 2);
    }

    #[test]
    fn test_update_without_replacement_does_not_write() {
        let mut store = MemoryStore::with_quotes(vec![q("A", "x")]);
        let stats = store.stats();

        let seen = store.update(|stored| (None, stored)).unwrap();

        assert_eq!(seen, Some(vec![q("A", "x")]));
        assert_eq!(stats.writes(), 0);
    }

    #[test]
    fn test_update_replaces_collection() {
        let mut store = MemoryStore::new();

        let len = store
            .update(|stored| {
                assert!(stored.is_none());
                let grown = vec![q("A", "x"), q("B", "y")];
                let len = grown.len();
                (Some(grown), len)
            })
            .unwrap();

        assert_eq!(len, 2);
        assert_eq!(store.load().unwrap().map(|quotes| quotes.len()), Some(2));
    }
}
