//! View-side state and reconciliation
//!
//! The panel never talks to the network itself: it seeds its display state
//! from the cache store for an instant paint, then reconciles each slot
//! against the live reply relayed through the message router. A slot that
//! hydrated successfully from cache is never downgraded to an error display
//! just because the live refresh failed.

use crossterm::event::{KeyCode, KeyEvent};
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::{PublicData, ResultEnvelope, UserBenefits, UserStatus};
use crate::cache::{CacheStore, PUBLIC_DATA_CACHE, USER_BENEFITS_CACHE, USER_STATUS_CACHE};
use crate::router::{RouterHandle, GET_PUBLIC_DATA, GET_USER_BENEFITS, GET_USER_STATUS};

/// Error shown when the reply channel closed without delivering a reply
const NO_REPLY_ERROR: &str = "no response from background service";

/// Error shown when a success reply carried an unusable payload
const BAD_PAYLOAD_ERROR: &str = "unexpected response payload";

/// Display state for one hydrated resource slot
///
/// Not persisted; rebuilt each run, seeded from the cache, then overwritten
/// by the live response when it arrives.
#[derive(Debug, Clone)]
pub struct ApiState<T> {
    /// Last known payload, from cache or a live reply
    pub data: Option<T>,
    /// Error shown when no payload is available
    pub error: Option<String>,
    /// Whether a fetch for this slot is outstanding
    pub is_loading: bool,
}

impl<T> ApiState<T> {
    /// A slot with a fetch already outstanding
    pub fn loading() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: true,
        }
    }

    /// A slot with no activity yet
    pub fn idle() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
        }
    }

    /// A slot hydrated from a cached payload
    pub fn cached(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            is_loading: false,
        }
    }
}

/// Applies a live reply to a slot.
///
/// `had_cache` records whether the slot held a payload before the refresh
/// was issued; when it did, failure replies leave that payload on display
/// instead of replacing it with an error. `None` means the reply channel
/// closed without a value.
pub fn apply_reply<T: DeserializeOwned>(
    state: &mut ApiState<T>,
    had_cache: bool,
    reply: Option<ResultEnvelope>,
) {
    state.is_loading = false;
    match reply {
        Some(envelope) if envelope.success => {
            match serde_json::from_value::<T>(envelope.data.unwrap_or(Value::Null)) {
                Ok(data) => {
                    state.data = Some(data);
                    state.error = None;
                }
                Err(_) => {
                    if !had_cache {
                        state.error = Some(BAD_PAYLOAD_ERROR.to_string());
                    }
                }
            }
        }
        Some(envelope) => {
            if !had_cache {
                state.error = envelope.error;
            }
        }
        None => {
            if !had_cache {
                state.error = Some(NO_REPLY_ERROR.to_string());
            }
        }
    }
}

/// Whether the dependent benefits fetch may fire.
///
/// Only once user status has resolved to a logged-in user: never while the
/// status slot is still loading and never for a logged-out session.
pub fn should_fetch_benefits(status: &ApiState<UserStatus>) -> bool {
    !status.is_loading && status.data.as_ref().is_some_and(|s| s.is_logged_in)
}

/// Panel state: the three hydrated slots plus input handling
pub struct App {
    /// Announcement slot
    pub public_data: ApiState<PublicData>,
    /// Login state slot
    pub user_status: ApiState<UserStatus>,
    /// Subscription benefits slot, dependent on a logged-in status
    pub user_benefits: ApiState<UserBenefits>,
    /// Login page offered to logged-out users
    pub login_url: String,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag indicating a refresh has been requested
    pub refresh_requested: bool,
    /// Read access to the cached payloads
    store: CacheStore,
    /// Channel to the mediator
    router: RouterHandle,
}

impl App {
    /// Creates the panel state with both primary slots loading.
    pub fn new(store: CacheStore, router: RouterHandle, login_url: String) -> Self {
        Self {
            public_data: ApiState::loading(),
            user_status: ApiState::loading(),
            user_benefits: ApiState::idle(),
            login_url,
            should_quit: false,
            refresh_requested: false,
            store,
            router,
        }
    }

    /// Seeds the announcement and status slots from the cache store.
    ///
    /// Called once before the first paint. Slots with a cached payload stop
    /// loading immediately so the panel can show them while the live
    /// refresh is still in flight.
    pub async fn hydrate_from_cache(&mut self) {
        if let Some(data) = self.store.get::<PublicData>(PUBLIC_DATA_CACHE).await {
            self.public_data = ApiState::cached(data);
        }
        if let Some(data) = self.store.get::<UserStatus>(USER_STATUS_CACHE).await {
            self.user_status = ApiState::cached(data);
        }
    }

    /// Refreshes the announcement and status slots through the router,
    /// then the dependent benefits slot when status resolves logged-in.
    pub async fn refresh(&mut self) {
        let had_public = self.public_data.data.is_some();
        let had_status = self.user_status.data.is_some();

        let public_rx = self.router.request(GET_PUBLIC_DATA).await;
        let status_rx = self.router.request(GET_USER_STATUS).await;
        let mut replies = join_all([public_rx, status_rx]).await.into_iter();

        apply_reply(
            &mut self.public_data,
            had_public,
            replies.next().and_then(Result::ok),
        );
        apply_reply(
            &mut self.user_status,
            had_status,
            replies.next().and_then(Result::ok),
        );

        if should_fetch_benefits(&self.user_status) {
            self.refresh_benefits().await;
        }
    }

    /// Runs the cache-then-refresh pattern for the benefits slot.
    async fn refresh_benefits(&mut self) {
        self.user_benefits.is_loading = true;
        if let Some(data) = self.store.get::<UserBenefits>(USER_BENEFITS_CACHE).await {
            self.user_benefits = ApiState::cached(data);
        }

        let had_cache = self.user_benefits.data.is_some();
        let reply = self.router.request(GET_USER_BENEFITS).await.await.ok();
        apply_reply(&mut self.user_benefits, had_cache, reply);
    }

    /// Handles keyboard input.
    ///
    /// # Key Bindings
    /// - `q` or `Esc`: quit
    /// - `r`: request a refresh
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => {
                self.refresh_requested = true;
            }
            _ => {}
        }
    }
}
