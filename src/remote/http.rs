//! HTTP remote source.
//!
//! `GET <base_url>/quotes` returns the authoritative collection as a JSON
//! array (or `{"quotes": [...]}`); `POST <base_url>/quotes` publishes one
//! quote.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use super::{normalize_records, RemoteError, RemotePayload, RemoteSource};
use crate::config::{DEFAULT_REMOTE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::model::{Collection, Quote};

/// Remote source backed by a JSON HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

/// Body sent when publishing a quote.
#[derive(Debug, Serialize)]
struct PostQuoteRequest<'a> {
    text: &'a str,
    category: &'a str,
}

impl HttpRemote {
    /// Create a remote for `base_url` with the default timeout.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_config(base_url, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    /// Create a remote with an explicit per-request timeout.
    #[must_use]
    pub fn with_config(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn quotes_url(&self) -> String {
        format!("{}/quotes", self.base_url)
    }
}

impl Default for HttpRemote {
    fn default() -> Self {
        Self::new(DEFAULT_REMOTE_URL)
    }
}

impl RemoteSource for HttpRemote {
    async fn fetch_quotes(&self) -> Result<Collection, RemoteError> {
        let url = self.quotes_url();
        debug!(%url, "Fetching remote quotes");

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RemoteError::Status {
                status: response.status().as_u16(),
            });
        }

        let payload: RemotePayload = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        Ok(normalize_records(payload.into_records()))
    }

    async fn post_quote(&self, quote: &Quote) -> Result<(), RemoteError> {
        let request = PostQuoteRequest {
            text: quote.text(),
            category: quote.category(),
        };

        let response = self
            .client
            .post(self.quotes_url())
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RemoteError::Status {
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let remote = HttpRemote::new("http://example.test/api/");
        assert_eq!(remote.base_url(), "http://example.test/api");
        assert_eq!(remote.quotes_url(), "http://example.test/api/quotes");
    }

    #[test]
    fn test_default_uses_default_url() {
        let remote = HttpRemote::default();
        assert_eq!(remote.base_url(), DEFAULT_REMOTE_URL);
    }

    #[tokio::test]
    async fn test_unreachable_remote_is_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let remote = HttpRemote::with_config("http://127.0.0.1:9", Duration::from_millis(500));
        let result = remote.fetch_quotes().await;
        assert!(matches!(result, Err(RemoteError::Transport(_))));
    }
}
