//! Wire types shared between the fetch mediator, router, and view
//!
//! Every resource fetch resolves to a `ResultEnvelope`; the `data` payloads
//! inside it are the domain types below. Field names follow the server's
//! JSON schema, so the Rust names carry serde renames where they differ.

pub mod client;

pub use client::{ApiClient, NETWORK_ERROR_MESSAGE};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform success/data/error wrapper returned by every resource fetch
///
/// Exactly one of `data`/`error` is meaningfully populated, matching
/// `success`. Failures below the mediator are converted into this shape;
/// no error type ever crosses the message-channel boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEnvelope<T = Value> {
    /// Whether the request succeeded
    pub success: bool,
    /// Payload for successful requests
    #[serde(default)]
    pub data: Option<T>,
    /// Human-readable error for failed requests
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ResultEnvelope<T> {
    /// Builds a success envelope around `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Builds a failure envelope carrying `error`.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Public announcement payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicData {
    /// Latest site-wide announcement, if any
    #[serde(default)]
    pub latest_announcement: Option<String>,
}

/// Login state for the current session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatus {
    /// Whether the session belongs to a logged-in user
    pub is_logged_in: bool,
    /// Account email, present when logged in
    #[serde(default)]
    pub email: Option<String>,
    /// Account plan name, present when logged in
    #[serde(default)]
    pub plan: Option<String>,
}

/// Subscription benefits for a logged-in user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBenefits {
    /// Identifier of the active plan, if any
    pub active_plan_id: Option<String>,
    /// Subscription state reported by the billing system
    pub subscription_status: Option<String>,
}
