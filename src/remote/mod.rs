//! Remote quote source.
//!
//! The sync orchestrator talks to the authoritative remote through the
//! [`RemoteSource`] trait. [`HttpRemote`] is the shipped implementation;
//! tests provide their own.
//!
//! Whatever the transport, a source must hand back only valid quotes:
//! [`normalize_records`] drops malformed upstream entries before they reach
//! the merge engine.

mod http;

pub use http::HttpRemote;

use serde::Deserialize;
use tracing::debug;

use crate::model::{Collection, Quote, RawQuote};

/// Failures talking to the remote source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("remote returned HTTP {status}")]
    Status { status: u16 },

    #[error("invalid response: {0}")]
    Decode(String),
}

/// Trait for remote quote sources.
///
/// Uses async methods because fetches are long-latency I/O.
pub trait RemoteSource: Send + Sync {
    /// Fetch the remote collection, already normalized.
    fn fetch_quotes(
        &self,
    ) -> impl std::future::Future<Output = Result<Collection, RemoteError>> + Send;

    /// Publish a locally added quote. Best effort; callers never roll back
    /// on failure.
    fn post_quote(
        &self,
        quote: &Quote,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>> + Send;
}

/// Response body shapes accepted from a remote.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RemotePayload {
    List(Vec<serde_json::Value>),
    Wrapped { quotes: Vec<serde_json::Value> },
}

impl RemotePayload {
    pub(crate) fn into_records(self) -> Vec<serde_json::Value> {
        match self {
            Self::List(records) | Self::Wrapped { quotes: records } => records,
        }
    }
}

/// Turn raw upstream records into valid quotes, dropping the rest.
#[must_use]
pub fn normalize_records(records: Vec<serde_json::Value>) -> Collection {
    let total = records.len();
    let quotes: Collection = records
        .into_iter()
        .filter_map(|value| {
            let raw: RawQuote = serde_json::from_value(value)
                .map_err(|e| debug!(error = %e, "Dropping non-object remote record"))
                .ok()?;
            Quote::try_from(raw)
                .map_err(|e| debug!(error = %e, "Dropping invalid remote record"))
                .ok()
        })
        .collect();

    if quotes.len() < total {
        debug!(dropped = total - quotes.len(), kept = quotes.len(), "Normalized remote records");
    }
    quotes
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_drops_malformed() {
        let records = vec![
            json!({"text": " Be brave ", "category": "Bravery"}),
            json!({"text": "", "category": "Empty"}),
            json!({"text": "No category"}),
            json!(42),
            json!({"title": "From title", "category": "Remote"}),
        ];

        let quotes = normalize_records(records);

        assert_eq!(
            quotes,
            vec![
                Quote::new("Be brave", "Bravery").unwrap(),
                Quote::new("From title", "Remote").unwrap(),
            ]
        );
    }

    #[test]
    fn test_payload_shapes() {
        let list: RemotePayload = serde_json::from_str(r#"[{"text":"a","category":"b"}]"#).unwrap();
        assert_eq!(list.into_records().len(), 1);

        let wrapped: RemotePayload =
            serde_json::from_str(r#"{"quotes":[{"text":"a","category":"b"},{}]}"#).unwrap();
        assert_eq!(wrapped.into_records().len(), 2);

        assert!(serde_json::from_str::<RemotePayload>(r#"{"items":[]}"#).is_err());
    }
}
