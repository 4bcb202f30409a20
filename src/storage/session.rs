//! Session-scoped "last viewed quote" cache.
//!
//! One small JSON file per terminal session under `<data_dir>/session/`.
//! Entries expire after two hours, which is how a new session starts from
//! a clean slate.
//!
//! # Session key resolution
//!
//! 1. `QB_SESSION_KEY` env var (explicit override)
//! 2. `TERM_SESSION_ID` env var (macOS Terminal.app)
//! 3. `ITERM_SESSION_ID` env var (iTerm2)
//! 4. Parent process id (the shell that launched `qb`)

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::model::Quote;

/// Cache TTL: 2 hours.
const CACHE_TTL_MS: i64 = 2 * 60 * 60 * 1000;

/// The last quote shown in this session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastViewed {
    pub quote: Quote,
    /// Unix milliseconds.
    pub viewed_at: i64,
}

/// Reader/writer for the per-session cache.
#[derive(Debug, Clone)]
pub struct SessionCache {
    dir: PathBuf,
    key: Option<String>,
}

impl SessionCache {
    /// Cache under `<data_dir>/session` keyed by the current session.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self::with_key(data_dir, current_session_key())
    }

    /// Cache with an explicit key (`None` disables the cache).
    #[must_use]
    pub fn with_key(data_dir: &Path, key: Option<String>) -> Self {
        Self {
            dir: data_dir.join("session"),
            key: key.as_deref().and_then(sanitize_key),
        }
    }

    fn path(&self) -> Option<PathBuf> {
        self.key
            .as_ref()
            .map(|key| self.dir.join(format!("{key}.json")))
    }

    /// Read the last viewed quote.
    ///
    /// Returns `None` if there is no session key, no entry, the entry is
    /// stale (it is removed) or the file is corrupted.
    #[must_use]
    pub fn read(&self) -> Option<LastViewed> {
        let path = self.path()?;
        let content = fs::read_to_string(&path).ok()?;
        let entry: LastViewed = serde_json::from_str(&content).ok()?;

        let now = chrono::Utc::now().timestamp_millis();
        if now.saturating_sub(entry.viewed_at) > CACHE_TTL_MS {
            let _ = fs::remove_file(&path);
            return None;
        }

        Some(entry)
    }

    /// Record `quote` as last viewed.
    ///
    /// Written to a temp file and renamed into place. Returns `true` on
    /// success; failures only cost the redisplay convenience.
    pub fn write(&self, quote: &Quote) -> bool {
        let Some(path) = self.path() else {
            return false;
        };

        let entry = LastViewed {
            quote: quote.clone(),
            viewed_at: chrono::Utc::now().timestamp_millis(),
        };
        let Ok(json) = serde_json::to_string_pretty(&entry) else {
            return false;
        };

        let temp_path = path.with_extension("json.tmp");
        let result = (|| -> std::io::Result<()> {
            fs::create_dir_all(&self.dir)?;
            {
                let mut opts = fs::OpenOptions::new();
                opts.write(true).create(true).truncate(true);
                #[cfg(unix)]
                opts.mode(0o600);
                let mut file = opts.open(&temp_path)?;
                file.write_all(json.as_bytes())?;
                file.flush()?;
            }
            fs::rename(&temp_path, &path)?;
            Ok(())
        })();

        if let Err(e) = &result {
            debug!(error = %e, "Could not write session cache");
        }
        result.is_ok()
    }

    /// Remove this session's entry.
    pub fn clear(&self) -> bool {
        match self.path() {
            Some(path) if path.exists() => fs::remove_file(&path).is_ok(),
            Some(_) => true,
            None => false,
        }
    }
}

/// Session key for this terminal, see the module docs.
#[must_use]
pub fn current_session_key() -> Option<String> {
    for var in ["QB_SESSION_KEY", "TERM_SESSION_ID", "ITERM_SESSION_ID"] {
        if let Ok(value) = std::env::var(var) {
            if !value.trim().is_empty() {
                return Some(value);
            }
        }
    }

    #[cfg(unix)]
    let fallback = Some(format!("ppid-{}", std::os::unix::process::parent_id()));
    #[cfg(not(unix))]
    let fallback = None;
    fallback
}

/// Sanitize a key for use as a filename.
fn sanitize_key(key: &str) -> Option<String> {
    let sanitized: String = key
        .trim()
        .chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_whitespace()
            {
                '_'
            } else {
                c
            }
        })
        .take(100)
        .collect();

    if sanitized.is_empty() {
        None
    } else {
        Some(sanitized)
    }
}
