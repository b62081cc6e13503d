//! Request signing
//!
//! Derives the authentication tag attached to every outbound API request:
//! an HMAC-SHA256 over `timestamp + "." + payload` keyed by the shared
//! secret, base64-encoded. Signing is pure and deterministic; the same
//! inputs always produce the same tag.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Computes authentication tags for outbound requests
#[derive(Debug, Clone)]
pub struct Signer {
    /// Shared signing secret; validated non-empty at startup
    secret: String,
}

impl Signer {
    /// Creates a signer from the shared secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Signs one request.
    ///
    /// # Arguments
    /// * `timestamp` - decimal string form of the current time in milliseconds
    /// * `payload` - the exact query string of the target URL, leading `?`
    ///   included, or the empty string; no other part of the URL participates
    ///
    /// # Returns
    /// The base64-encoded HMAC-SHA256 tag over `timestamp + "." + payload`.
    pub fn sign(&self, timestamp: &str, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }
}
