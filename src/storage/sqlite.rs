//! SQLite storage implementation.
//!
//! Writes go through [`SqliteStore::mutate`], which wraps each operation in
//! an IMMEDIATE transaction so a collection is either fully replaced or not
//! touched at all.

use rusqlite::{Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{Collection, Quote};
use crate::storage::schema::apply_schema;
use crate::storage::QuoteStore;

/// Settings key marking that the collection has been saved at least once.
const KEY_INITIALIZED: &str = "quotes_initialized";
/// Settings key for the persisted filter selection.
const KEY_SELECTION: &str = "selected_category";
/// Settings key marking that a sync snapshot exists.
const KEY_SNAPSHOT: &str = "snapshot_recorded";

/// Tables holding ordered quote lists.
#[derive(Debug, Clone, Copy)]
enum QuoteTable {
    Quotes,
    Snapshot,
}

impl QuoteTable {
    const fn name(self) -> &'static str {
        match self {
            Self::Quotes => "quotes",
            Self::Snapshot => "sync_snapshot",
        }
    }

    const fn marker(self) -> &'static str {
        match self {
            Self::Quotes => KEY_INITIALIZED,
            Self::Snapshot => KEY_SNAPSHOT,
        }
    }
}

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a database with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_millis(timeout_ms.unwrap_or(5000)))?;

        apply_schema(&conn)?;
        debug!(path = %path.display(), "Opened quote store");
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Execute a write inside an IMMEDIATE transaction.
    ///
    /// The transaction is rolled back if the closure fails.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let result = f(&tx)?;

        tx.commit()?;
        debug!(op, "Committed");
        Ok(result)
    }

    /// Number of stored quotes, including rows that would fail validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_quotes(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM quotes", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

fn read_quotes(conn: &Connection, table: QuoteTable) -> Result<Option<Collection>> {
    if get_setting(conn, table.marker())?.is_none() {
        return Ok(None);
    }

    let sql = format!(
        "SELECT position, text, category FROM {} ORDER BY position ASC",
        table.name()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut quotes = Vec::new();
    for row in rows {
        let (position, text, category) = row?;
        match Quote::new(&text, &category) {
            Ok(quote) => quotes.push(quote),
            Err(e) => warn!(
                table = table.name(),
                position,
                error = %e,
                "Skipping invalid stored quote"
            ),
        }
    }

    Ok(Some(quotes))
}

fn replace_quotes(tx: &Transaction, table: QuoteTable, quotes: &[Quote]) -> Result<()> {
    tx.execute(&format!("DELETE FROM {}", table.name()), [])?;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {} (position, text, category) VALUES (?1, ?2, ?3)",
            table.name()
        ))?;
        for (position, quote) in (0_i64..).zip(quotes) {
            stmt.execute(rusqlite::params![position, quote.text(), quote.category()])?;
        }
    }
    put_setting(tx, table.marker(), "1")
}

fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(value)
}

fn put_setting(tx: &Transaction, key: &str, value: &str) -> Result<()> {
    tx.execute(
        "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        rusqlite::params![key, value, chrono::Utc::now().timestamp_millis()],
    )?;
    Ok(())
}

impl QuoteStore for SqliteStore {
    fn load(&self) -> Result<Option<Collection>> {
        read_quotes(&self.conn, QuoteTable::Quotes)
    }

    fn save(&mut self, quotes: &[Quote]) -> Result<()> {
        self.mutate("replace_quotes", |tx| {
            replace_quotes(tx, QuoteTable::Quotes, quotes)
        })
    }

    fn update<T, F>(&mut self, edit: F) -> Result<T>
    where
        F: FnOnce(Option<Collection>) -> (Option<Collection>, T),
    {
        self.mutate("update_quotes", |tx| {
            let (replacement, value) = edit(read_quotes(tx, QuoteTable::Quotes)?);
            if let Some(quotes) = replacement {
                replace_quotes(tx, QuoteTable::Quotes, &quotes)?;
            }
            Ok(value)
        })
    }

    fn load_selection(&self) -> Result<Option<String>> {
        get_setting(&self.conn, KEY_SELECTION)
    }

    fn save_selection(&mut self, selection: &str) -> Result<()> {
        self.mutate("save_selection", |tx| put_setting(tx, KEY_SELECTION, selection))
    }

    fn load_snapshot(&self) -> Result<Option<Collection>> {
        read_quotes(&self.conn, QuoteTable::Snapshot)
    }

    fn save_snapshot(&mut self, quotes: &[Quote]) -> Result<()> {
        self.mutate("replace_snapshot", |tx| {
            replace_quotes(tx, QuoteTable::Snapshot, quotes)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn q(text: &str, category: &str) -> Quote {
        Quote::new(text, category).unwrap()
    }

    #[test]
    fn test_load_empty_is_none() {
        let store = SqliteStore::open_memory().unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(store.load_snapshot().unwrap().is_none());
        assert!(store.load_selection().unwrap().is_none());
    }

    #[test]
    fn test_save_load_preserves_order() {
        let mut store = SqliteStore::open_memory().unwrap();
        let quotes = vec![q("Zeta", "b"), q("Alpha", "a"), q("Alpha", "c"), q("Mid", "b")];

        store.save(&quotes).unwrap();

        assert_eq!(store.load().unwrap(), Some(quotes));
    }

    #[test]
    fn test_save_empty_is_not_none() {
        let mut store = SqliteStore::open_memory().unwrap();
        store.save(&[]).unwrap();
        assert_eq!(store.load().unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_save_replaces_previous() {
        let mut store = SqliteStore::open_memory().unwrap();
        store.save(&[q("A", "x"), q("B", "y")]).unwrap();
        store.save(&[q("C", "z")]).unwrap();
        assert_eq!(store.load().unwrap(), Some(vec![q("C", "z")]));
        assert_eq!(store.count_quotes().unwrap(), 1);
    }

    #[test]
    fn test_invalid_rows_are_skipped() {
        let mut store = SqliteStore::open_memory().unwrap();
        store.save(&[q("A", "x")]).unwrap();
        store
            .conn
            .execute(
                "INSERT INTO quotes (position, text, category) VALUES (5, '   ', 'x')",
                [],
            )
            .unwrap();

        assert_eq!(store.count_quotes().unwrap(), 2);
        assert_eq!(store.load().unwrap(), Some(vec![q("A", "x")]));
    }

    #[test]
    fn test_selection_roundtrip() {
        let mut store = SqliteStore::open_memory().unwrap();
        store.save_selection("Motivation").unwrap();
        store.save_selection("Life").unwrap();
        assert_eq!(store.load_selection().unwrap(), Some("Life".to_string()));
    }

    #[test]
    fn test_snapshot_is_separate_from_quotes() {
        let mut store = SqliteStore::open_memory().unwrap();
        store.save_snapshot(&[q("Remote", "r")]).unwrap();
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.load_snapshot().unwrap(), Some(vec![q("Remote", "r")]));
    }

    #[test]
    fn test_reopen_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("quotebook.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.save(&[q("Persisted", "Disk")]).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.load().unwrap(), Some(vec![q("Persisted", "Disk")]));
    }

    #[test]
    fn test_update_reads_rows_written_by_another_connection() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("quotebook.db");
        let mut first = SqliteStore::open(&path).unwrap();
        let mut second = SqliteStore::open(&path).unwrap();

        first.save(&[q("First", "a")]).unwrap();
        second
            .update(|stored| {
                let mut grown = stored.unwrap_or_default();
                grown.push(q("Second", "b"));
                (Some(grown), ())
            })
            .unwrap();

        assert_eq!(
            first.load().unwrap(),
            Some(vec![q("First", "a"), q("Second", "b")])
        );
    }

    #[test]
    fn test_update_without_replacement_leaves_store_untouched() {
        let mut store = SqliteStore::open_memory().unwrap();

        let seen = store.update(|stored| (None, stored)).unwrap();

        assert!(seen.is_none());
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.count_quotes().unwrap(), 0);
    }
}
