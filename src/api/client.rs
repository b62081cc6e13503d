//! Signed fetch mediator
//!
//! Runs one logical "get resource" operation: sign the request, call the
//! remote API, update or invalidate the cache, and return a uniform
//! envelope. Failures never escape as errors; every call resolves to a
//! `ResultEnvelope`, and every call performs exactly one cache mutation, a
//! write on success or a removal on any failure.

use chrono::Utc;
use reqwest::{header, Client, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::config::Config;
use crate::signer::Signer;

use super::ResultEnvelope;

/// Fixed message returned for any transport-level failure, independent of
/// the underlying cause
pub const NETWORK_ERROR_MESSAGE: &str = "connection error, please check your network";

/// Header carrying the request timestamp in decimal milliseconds
const TIMESTAMP_HEADER: &str = "x-timestamp";

/// Header carrying the base64 authentication tag
const SIGNATURE_HEADER: &str = "x-signature";

/// Errors that can occur below the mediator boundary
///
/// None of these escape `fetch`: they collapse into a failure envelope with
/// the fixed network-error message.
#[derive(Debug, Error)]
enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body was not a valid envelope
    #[error("failed to parse response body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// The composed URL did not parse
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

/// Client for fetching signed resources from the remote API
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Signer deriving the per-request authentication tag
    signer: Signer,
    /// Store holding the last-known-good payload per resource
    store: CacheStore,
    /// Base URL every endpoint path is appended to
    base_url: String,
    /// Session cookie attached to authenticated requests, if configured
    session_cookie: Option<String>,
}

impl ApiClient {
    /// Creates a client from the validated configuration and cache store.
    pub fn new(config: &Config, store: CacheStore) -> Self {
        Self {
            http_client: Client::new(),
            signer: Signer::new(config.secret.clone()),
            store,
            base_url: config.base_url.clone(),
            session_cookie: config.session_cookie.clone(),
        }
    }

    /// Returns the cache store this client mutates.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Fetches one resource and reconciles the cache.
    ///
    /// # Arguments
    /// * `endpoint` - path (with optional query string) appended to the base URL
    /// * `authenticated` - whether the session cookie is attached
    /// * `cache_key` - which cache slot this resource occupies
    ///
    /// # Behavior
    /// On a success envelope the raw `data` payload is written under
    /// `cache_key`, and the envelope is returned unchanged. On a
    /// server-reported failure the entry is removed and the server's error
    /// is relayed verbatim. On any transport failure (connection error,
    /// malformed body, bad URL) the entry is removed and a failure envelope
    /// with a fixed network-error message is returned. The cache is never
    /// left holding stale data behind a confirmed failure.
    pub async fn fetch(&self, endpoint: &str, authenticated: bool, cache_key: &str) -> ResultEnvelope {
        match self.fetch_envelope(endpoint, authenticated).await {
            Ok(envelope) if envelope.success => {
                let data = envelope.data.clone().unwrap_or(Value::Null);
                if let Err(err) = self.store.set(cache_key, &data).await {
                    warn!(cache_key, %err, "failed to write cache entry");
                }
                envelope
            }
            Ok(envelope) => {
                debug!(endpoint, error = envelope.error.as_deref(), "server reported failure");
                self.invalidate(cache_key).await;
                envelope
            }
            Err(err) => {
                warn!(endpoint, %err, "transport failure");
                self.invalidate(cache_key).await;
                ResultEnvelope::failure(NETWORK_ERROR_MESSAGE)
            }
        }
    }

    /// Issues the signed network call and parses the response envelope.
    async fn fetch_envelope(
        &self,
        endpoint: &str,
        authenticated: bool,
    ) -> Result<ResultEnvelope, FetchError> {
        let full_url = format!("{}{}", self.base_url, endpoint);
        let url = Url::parse(&full_url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        // Only the query string portion of the URL is signed.
        let payload = query_payload(&url);
        let timestamp = Utc::now().timestamp_millis().to_string();
        let signature = self.signer.sign(&timestamp, &payload);

        let mut request = self
            .http_client
            .get(url)
            .header(TIMESTAMP_HEADER, &timestamp)
            .header(SIGNATURE_HEADER, &signature);
        if authenticated {
            if let Some(cookie) = &self.session_cookie {
                request = request.header(header::COOKIE, cookie);
            }
        }

        let response = request.send().await?;
        let text = response.text().await?;
        let envelope: ResultEnvelope = serde_json::from_str(&text)?;
        Ok(envelope)
    }

    /// Removes the cache entry for `cache_key`, logging I/O errors without
    /// surfacing them.
    async fn invalidate(&self, cache_key: &str) {
        if let Err(err) = self.store.remove(cache_key).await {
            warn!(cache_key, %err, "failed to invalidate cache entry");
        }
    }
}

/// Extracts the signable query string: `?`-prefixed when present and
/// non-empty, otherwise the empty string.
fn query_payload(url: &Url) -> String {
    match url.query() {
        Some(query) if !query.is_empty() => format!("?{query}"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_payload_includes_leading_question_mark() {
        let url = Url::parse("https://api.example.com/panel/data?scope=panel&v=2").unwrap();

        assert_eq!(query_payload(&url), "?scope=panel&v=2");
    }

    #[test]
    fn test_query_payload_empty_without_query() {
        let url = Url::parse("https://api.example.com/panel/data").unwrap();

        assert_eq!(query_payload(&url), "");
    }

    #[test]
    fn test_query_payload_empty_for_bare_question_mark() {
        let url = Url::parse("https://api.example.com/panel/data?").unwrap();

        assert_eq!(query_payload(&url), "");
    }

    #[test]
    fn test_network_error_message_is_fixed() {
        assert_eq!(
            NETWORK_ERROR_MESSAGE,
            "connection error, please check your network"
        );
    }
}
