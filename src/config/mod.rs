//! Configuration management.
//!
//! Quotebook keeps everything in one data directory:
//! - **Database**: `<data_dir>/quotebook.db`
//! - **Settings**: `<data_dir>/config.json`
//! - **Session cache**: `<data_dir>/session/`
//!
//! Each setting resolves as: CLI flag > environment variable > config file
//! > built-in default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Default remote base URL.
pub const DEFAULT_REMOTE_URL: &str = "http://localhost:3000";

/// Default interval between periodic sync cycles.
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;

/// Default per-request timeout for the remote.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

const CONFIG_FILE: &str = "config.json";
const DB_FILE: &str = "quotebook.db";

/// Settings stored in `config.json`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_interval_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Settings {
    /// Overlay `other` onto `self`; values present in `other` win.
    #[must_use]
    pub fn merged_with(self, other: &Settings) -> Settings {
        Settings {
            remote_url: other.remote_url.clone().or(self.remote_url),
            sync_interval_secs: other.sync_interval_secs.or(self.sync_interval_secs),
            request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub remote_url: String,
    pub sync_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl ResolvedConfig {
    #[must_use]
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs.max(1))
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides<'a> {
    pub data_dir: Option<&'a Path>,
    pub db_path: Option<&'a Path>,
    pub remote_url: Option<&'a str>,
    pub sync_interval_secs: Option<u64>,
}

/// Get the default data directory (`~/.quotebook`).
#[must_use]
pub fn default_data_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".quotebook"))
}

/// Resolve the data directory.
///
/// Priority:
/// 1. Explicit path (CLI flag)
/// 2. `QB_DATA_DIR` environment variable
/// 3. `~/.quotebook`
///
/// # Errors
///
/// Returns an error if no home directory can be determined.
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Some(dir) = non_empty_env("QB_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }

    default_data_dir().ok_or_else(|| Error::Config("Could not determine home directory".into()))
}

/// Path of `config.json` inside a data directory.
#[must_use]
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Load `config.json`. A missing file yields default settings.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file exists but cannot be read or parsed.
pub fn load_settings(data_dir: &Path) -> Result<Settings> {
    let path = config_path(data_dir);

    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))
}

/// Merge `update` into the stored settings and write them back.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file cannot be read, parsed or written.
pub fn save_settings(data_dir: &Path, update: &Settings) -> Result<Settings> {
    let merged = load_settings(data_dir)?.merged_with(update);
    let path = config_path(data_dir);

    fs::create_dir_all(data_dir)
        .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;

    let content = serde_json::to_string_pretty(&merged)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

    fs::write(&path, content)
        .map_err(|e| Error::Config(format!("Failed to write config file: {e}")))?;

    Ok(merged)
}

/// Resolve every setting from flags, environment, file and defaults.
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined, the config
/// file is malformed, or an environment value does not parse.
pub fn resolve(overrides: &Overrides<'_>) -> Result<ResolvedConfig> {
    let data_dir = resolve_data_dir(overrides.data_dir)?;
    let file = load_settings(&data_dir)?;

    let db_path = overrides
        .db_path
        .map(Path::to_path_buf)
        .or_else(|| non_empty_env("QB_DB").map(PathBuf::from))
        .unwrap_or_else(|| data_dir.join(DB_FILE));

    let remote_url = overrides
        .remote_url
        .map(ToString::to_string)
        .or_else(|| non_empty_env("QB_REMOTE_URL"))
        .or(file.remote_url)
        .unwrap_or_else(|| DEFAULT_REMOTE_URL.to_string());

    let sync_interval_secs = match overrides.sync_interval_secs {
        Some(secs) => secs,
        None => match non_empty_env("QB_SYNC_INTERVAL") {
            Some(raw) => parse_secs("QB_SYNC_INTERVAL", &raw)?,
            None => file.sync_interval_secs.unwrap_or(DEFAULT_SYNC_INTERVAL_SECS),
        },
    };

    Ok(ResolvedConfig {
        data_dir,
        db_path,
        remote_url,
        sync_interval_secs,
        request_timeout_secs: file
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
    })
}

fn parse_secs(name: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{name} must be a whole number of seconds, got '{raw}'")))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_data_dir_with_explicit() {
        let explicit = PathBuf::from("/custom/quotebook");
        assert_eq!(resolve_data_dir(Some(&explicit)).unwrap(), explicit);
    }

    #[test]
    fn test_missing_config_is_default() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(load_settings(temp_dir.path()).unwrap(), Settings::default());
    }

    #[test]
    fn test_malformed_config_is_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(config_path(temp_dir.path()), "{ not json").unwrap();
        assert!(matches!(load_settings(temp_dir.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_save_settings_merges() {
        let temp_dir = TempDir::new().unwrap();
        save_settings(
            temp_dir.path(),
            &Settings {
                remote_url: Some("http://one".into()),
                sync_interval_secs: Some(60),
                request_timeout_secs: None,
            },
        )
        .unwrap();

        let merged = save_settings(
            temp_dir.path(),
            &Settings {
                sync_interval_secs: Some(5),
                ..Settings::default()
            },
        )
        .unwrap();

        assert_eq!(merged.remote_url.as_deref(), Some("http://one"));
        assert_eq!(merged.sync_interval_secs, Some(5));
        assert_eq!(load_settings(temp_dir.path()).unwrap(), merged);
    }

    #[test]
    fn test_resolve_flags_beat_file() {
        let temp_dir = TempDir::new().unwrap();
        save_settings(
            temp_dir.path(),
            &Settings {
                remote_url: Some("http://from-file".into()),
                sync_interval_secs: Some(45),
                request_timeout_secs: Some(3),
            },
        )
        .unwrap();

        let resolved = resolve(&Overrides {
            data_dir: Some(temp_dir.path()),
            db_path: Some(Path::new("/tmp/explicit.db")),
            remote_url: Some("http://from-flag"),
            sync_interval_secs: Some(7),
        })
        .unwrap();

        assert_eq!(resolved.remote_url, "http://from-flag");
        assert_eq!(resolved.sync_interval_secs, 7);
        assert_eq!(resolved.request_timeout_secs, 3);
        assert_eq!(resolved.db_path, PathBuf::from("/tmp/explicit.db"));
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("X", " 15 ").unwrap(), 15);
        assert!(parse_secs("X", "soon").is_err());
    }
}
