//! Error types for the Quotebook CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 4=validation, 6=remote, etc.)
//! - Retryability flags
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use thiserror::Error;

use crate::model::ValidationError;
use crate::remote::RemoteError;

/// Result type alias for Quotebook operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    DatabaseError,

    // Validation (exit 4)
    ValidationFailed,
    InvalidArgument,

    // Remote / sync (exit 6)
    FetchFailed,
    SyncFailed,
    SyncInFlight,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,
    ParseFailed,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::DatabaseError => "DATABASE_ERROR",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::FetchFailed => "FETCH_FAILED",
            Self::SyncFailed => "SYNC_FAILED",
            Self::SyncInFlight => "SYNC_IN_FLIGHT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::ParseFailed => "PARSE_FAILED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::DatabaseError => 2,
            Self::ValidationFailed | Self::InvalidArgument => 4,
            Self::FetchFailed | Self::SyncFailed | Self::SyncInFlight => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError | Self::ParseFailed => 8,
        }
    }

    /// Whether retrying the same operation later can succeed.
    ///
    /// Remote failures are transient; the next cycle retries them. Validation
    /// errors need corrected input instead.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed | Self::SyncFailed | Self::SyncInFlight | Self::DatabaseError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in Quotebook operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid quote: {0}")]
    Validation(#[from] ValidationError),

    #[error("Remote source error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Could not parse {source_name}: {message}")]
    Parse { source_name: String, message: String },

    #[error("Sync failed: {0}")]
    SyncFailed(String),

    #[error("A sync cycle is already running")]
    SyncInFlight,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a parse error for a named input.
    pub fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::Remote(_) => ErrorCode::FetchFailed,
            Self::Parse { .. } => ErrorCode::ParseFailed,
            Self::SyncFailed(_) => ErrorCode::SyncFailed,
            Self::SyncInFlight => ErrorCode::SyncInFlight,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Validation(ValidationError::EmptyText) => {
                Some("Quote text must contain non-whitespace characters".to_string())
            }
            Self::Validation(ValidationError::EmptyCategory) => Some(
                "Every quote needs a category, e.g. `qb add \"Dream big\" Motivation`".to_string(),
            ),
            Self::Remote(_) | Self::SyncFailed(_) => Some(
                "Local quotes were left untouched. Check `qb config show` for the remote URL \
                 and retry with `qb sync`."
                    .to_string(),
            ),
            Self::SyncInFlight => {
                Some("Wait for the running cycle to finish, then retry.".to_string())
            }
            Self::Parse { .. } => Some(
                "Expected a Quotebook export, a JSON array of {text, category} records, \
                 or one JSON record per line."
                    .to_string(),
            ),
            Self::Config(_) => Some(
                "Fix or remove config.json in the data directory (see `qb config show`)."
                    .to_string(),
            ),
            Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_exit_4() {
        let err = Error::from(ValidationError::EmptyText);
        assert_eq!(err.error_code(), ErrorCode::ValidationFailed);
        assert_eq!(err.exit_code(), 4);
        assert!(!err.error_code().is_retryable());
        assert!(err.hint().is_some());
    }

    #[test]
    fn test_remote_is_retryable() {
        let err = Error::from(RemoteError::Status { status: 503 });
        assert_eq!(err.exit_code(), 6);
        assert!(err.error_code().is_retryable());
    }

    #[test]
    fn test_sync_failure_shares_remote_exit_code() {
        let err = Error::SyncFailed("failed to persist merged quotes".into());
        assert_eq!(err.error_code().as_str(), "SYNC_FAILED");
        assert_eq!(err.exit_code(), 6);
        assert!(err.hint().is_some());
    }

    #[test]
    fn test_structured_json_includes_hint() {
        let err = Error::parse("import.json", "expected value at line 1");
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "PARSE_FAILED");
        assert_eq!(json["error"]["exit_code"], 8);
        assert!(json["error"]["hint"].is_string());
    }

    #[test]
    fn test_structured_json_without_hint() {
        let err = Error::Other("boom".to_string());
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
        assert!(json["error"].get("hint").is_none());
    }
}
