//! Message router
//!
//! Dispatches typed view requests to the fetch mediator. Requests arrive as
//! raw JSON bodies paired with a one-shot reply channel; each recognized
//! kind maps 1:1 to a fixed (endpoint, authenticated, cache key) triple and
//! gets exactly one delayed reply. Unrecognized kinds are dropped without a
//! reply. Lifecycle events fire a reply-less user-status fetch whose only
//! effect is to warm the cache.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::api::{ApiClient, ResultEnvelope};
use crate::cache::{PUBLIC_DATA_CACHE, USER_BENEFITS_CACHE, USER_STATUS_CACHE};

/// Message type requesting the public announcement resource
pub const GET_PUBLIC_DATA: &str = "GET_PUBLIC_DATA";

/// Message type requesting the user status resource
pub const GET_USER_STATUS: &str = "GET_USER_STATUS";

/// Message type requesting the user benefits resource
pub const GET_USER_BENEFITS: &str = "GET_USER_BENEFITS";

/// Capacity of the router's inbound channel
const INBOUND_CAPACITY: usize = 32;

/// A resource the router knows how to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Site-wide announcement, no credentials
    PublicData,
    /// Login state for the current session
    UserStatus,
    /// Subscription benefits, only meaningful when logged in
    UserBenefits,
}

impl Resource {
    /// Maps a message `type` string to a resource.
    ///
    /// Unknown strings map to `None`; the router declines those rather than
    /// failing.
    pub fn from_message_type(message_type: &str) -> Option<Self> {
        match message_type {
            GET_PUBLIC_DATA => Some(Self::PublicData),
            GET_USER_STATUS => Some(Self::UserStatus),
            GET_USER_BENEFITS => Some(Self::UserBenefits),
            _ => None,
        }
    }

    /// API path for this resource
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::PublicData => "/api/panel/public-data",
            Self::UserStatus => "/api/panel/user-status",
            Self::UserBenefits => "/api/panel/user-benefits",
        }
    }

    /// Whether the fetch attaches session credentials
    pub fn authenticated(self) -> bool {
        match self {
            Self::PublicData => false,
            Self::UserStatus | Self::UserBenefits => true,
        }
    }

    /// Cache slot this resource occupies
    pub fn cache_key(self) -> &'static str {
        match self {
            Self::PublicData => PUBLIC_DATA_CACHE,
            Self::UserStatus => USER_STATUS_CACHE,
            Self::UserBenefits => USER_BENEFITS_CACHE,
        }
    }
}

/// Lifecycle triggers that warm the user-status cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// First run after installation
    Installed,
    /// Environment startup
    Startup,
}

/// Messages accepted by the router task
#[derive(Debug)]
enum Inbound {
    /// A view request and its reply channel
    Request {
        body: Value,
        reply: oneshot::Sender<ResultEnvelope>,
    },
    /// A lifecycle trigger, no reply expected
    Lifecycle(LifecycleEvent),
}

/// Handle for sending requests to a spawned router
#[derive(Debug, Clone)]
pub struct RouterHandle {
    tx: mpsc::Sender<Inbound>,
}

impl RouterHandle {
    /// Sends a raw message body and returns the reply channel.
    ///
    /// The reply resolves with the mediator's envelope for recognized
    /// kinds. For unrecognized kinds the sender is dropped, so the receiver
    /// resolves closed without a value instead of hanging.
    pub async fn send(&self, body: Value) -> oneshot::Receiver<ResultEnvelope> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let _ = self.tx.send(Inbound::Request { body, reply: reply_tx }).await;
        reply_rx
    }

    /// Sends a typed request `{"type": <message_type>}`.
    pub async fn request(&self, message_type: &str) -> oneshot::Receiver<ResultEnvelope> {
        self.send(serde_json::json!({ "type": message_type })).await
    }

    /// Notifies the router of a lifecycle event.
    pub async fn notify_lifecycle(&self, event: LifecycleEvent) {
        let _ = self.tx.send(Inbound::Lifecycle(event)).await;
    }
}

/// Spawns the router task and returns its handle.
///
/// Each recognized request is served on its own task: concurrent duplicate
/// requests for the same resource are neither queued nor deduplicated, each
/// independently signs, fetches, and mutates the cache, and the store
/// reflects whichever completes last.
pub fn spawn(client: Arc<ApiClient>) -> RouterHandle {
    let (tx, mut rx) = mpsc::channel::<Inbound>(INBOUND_CAPACITY);

    tokio::spawn(async move {
        while let Some(inbound) = rx.recv().await {
            match inbound {
                Inbound::Request { body, reply } => {
                    let message_type = body.get("type").and_then(Value::as_str);
                    let Some(resource) = message_type.and_then(Resource::from_message_type) else {
                        // Dropping `reply` closes the channel; the caller
                        // observes "no reply" without an error in flight.
                        debug!(?message_type, "ignoring unrecognized message");
                        continue;
                    };

                    let client = Arc::clone(&client);
                    tokio::spawn(async move {
                        let envelope = client
                            .fetch(resource.endpoint(), resource.authenticated(), resource.cache_key())
                            .await;
                        let _ = reply.send(envelope);
                    });
                }
                Inbound::Lifecycle(event) => {
                    debug!(?event, "warming user status cache");
                    let client = Arc::clone(&client);
                    tokio::spawn(async move {
                        let resource = Resource::UserStatus;
                        let _ = client
                            .fetch(resource.endpoint(), resource.authenticated(), resource.cache_key())
                            .await;
                    });
                }
            }
        }
    });

    RouterHandle { tx }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_message_types_map_to_resources() {
        assert_eq!(
            Resource::from_message_type(GET_PUBLIC_DATA),
            Some(Resource::PublicData)
        );
        assert_eq!(
            Resource::from_message_type(GET_USER_STATUS),
            Some(Resource::UserStatus)
        );
        assert_eq!(
            Resource::from_message_type(GET_USER_BENEFITS),
            Some(Resource::UserBenefits)
        );
    }

    #[test]
    fn test_unknown_message_type_maps_to_none() {
        assert_eq!(Resource::from_message_type("OPEN_SETTINGS"), None);
        assert_eq!(Resource::from_message_type(""), None);
        assert_eq!(Resource::from_message_type("get_public_data"), None);
    }

    #[test]
    fn test_resource_endpoints_are_fixed() {
        assert_eq!(Resource::PublicData.endpoint(), "/api/panel/public-data");
        assert_eq!(Resource::UserStatus.endpoint(), "/api/panel/user-status");
        assert_eq!(Resource::UserBenefits.endpoint(), "/api/panel/user-benefits");
    }

    #[test]
    fn test_only_public_data_is_unauthenticated() {
        assert!(!Resource::PublicData.authenticated());
        assert!(Resource::UserStatus.authenticated());
        assert!(Resource::UserBenefits.authenticated());
    }

    #[test]
    fn test_resource_cache_keys_are_stable() {
        assert_eq!(Resource::PublicData.cache_key(), "public_data_cache");
        assert_eq!(Resource::UserStatus.cache_key(), "user_status_cache");
        assert_eq!(Resource::UserBenefits.cache_key(), "user_benefits_cache");
    }
}
