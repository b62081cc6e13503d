//! Integration tests for the message router protocol
//!
//! Checks the 1:1 mapping from message kinds to fetch triples, the silent
//! drop of unrecognized kinds, and the lifecycle cache warming.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderMap};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::time::{sleep, timeout};

use porthole::api::{ApiClient, NETWORK_ERROR_MESSAGE};
use porthole::cache::{CacheStore, PUBLIC_DATA_CACHE, USER_BENEFITS_CACHE, USER_STATUS_CACHE};
use porthole::config::Config;
use porthole::router::{
    self, LifecycleEvent, RouterHandle, GET_PUBLIC_DATA, GET_USER_BENEFITS, GET_USER_STATUS,
};

const SECRET: &str = "router-test-secret";

async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });
    addr
}

fn spawn_mediator(base_url: String, dir: &TempDir) -> (RouterHandle, CacheStore) {
    let store = CacheStore::with_dir(dir.path().to_path_buf());
    let config = Config::new(
        base_url,
        "http://localhost/login",
        SECRET,
        Some("session=abc".to_string()),
    )
    .expect("Test config should be valid");
    let client = Arc::new(ApiClient::new(&config, store.clone()));
    (router::spawn(client), store)
}

fn cookie_of(headers: &HeaderMap) -> Value {
    headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .map(|c| Value::String(c.to_string()))
        .unwrap_or(Value::Null)
}

/// Canned backend serving all three panel resources; each payload records
/// which resource served it and whether the request carried the cookie.
fn panel_backend() -> Router {
    Router::new()
        .route(
            "/api/panel/public-data",
            get(|headers: HeaderMap| async move {
                Json(json!({
                    "success": true,
                    "data": {"resource": "public-data", "cookie": cookie_of(&headers)}
                }))
            }),
        )
        .route(
            "/api/panel/user-status",
            get(|headers: HeaderMap| async move {
                Json(json!({
                    "success": true,
                    "data": {"resource": "user-status", "cookie": cookie_of(&headers)}
                }))
            }),
        )
        .route(
            "/api/panel/user-benefits",
            get(|headers: HeaderMap| async move {
                Json(json!({
                    "success": true,
                    "data": {"resource": "user-benefits", "cookie": cookie_of(&headers)}
                }))
            }),
        )
}

/// Polls the store until `key` appears or two seconds elapse.
async fn wait_for_entry(store: &CacheStore, key: &str) -> Option<Value> {
    for _ in 0..40 {
        if let Some(value) = store.get::<Value>(key).await {
            return Some(value);
        }
        sleep(Duration::from_millis(50)).await;
    }
    None
}

#[tokio::test]
async fn test_unrecognized_message_type_gets_no_reply() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, _store) = spawn_mediator("http://127.0.0.1:1".to_string(), &dir);

    let reply = handle.send(json!({"type": "OPEN_SETTINGS"})).await;

    // The router must decline silently: the reply channel closes without a
    // value, and the caller must observe that within a bounded wait.
    let result = timeout(Duration::from_secs(1), reply)
        .await
        .expect("Waiting for the dropped reply must not hang");
    assert!(result.is_err(), "No reply value may arrive for unknown kinds");
}

#[tokio::test]
async fn test_message_without_type_field_gets_no_reply() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, _store) = spawn_mediator("http://127.0.0.1:1".to_string(), &dir);

    let reply = handle.send(json!({"kind": GET_USER_STATUS})).await;

    let result = timeout(Duration::from_secs(1), reply)
        .await
        .expect("Waiting for the dropped reply must not hang");
    assert!(result.is_err());
}

#[tokio::test]
async fn test_each_kind_maps_to_its_resource_and_cache_key() {
    let addr = spawn_server(panel_backend()).await;
    let dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, store) = spawn_mediator(format!("http://{addr}"), &dir);

    let public = handle
        .request(GET_PUBLIC_DATA)
        .await
        .await
        .expect("Public data reply should arrive");
    let status = handle
        .request(GET_USER_STATUS)
        .await
        .await
        .expect("User status reply should arrive");
    let benefits = handle
        .request(GET_USER_BENEFITS)
        .await
        .await
        .expect("User benefits reply should arrive");

    assert_eq!(public.data.as_ref().unwrap()["resource"], "public-data");
    assert_eq!(status.data.as_ref().unwrap()["resource"], "user-status");
    assert_eq!(benefits.data.as_ref().unwrap()["resource"], "user-benefits");

    let cached_public: Value = store.get(PUBLIC_DATA_CACHE).await.expect("Public entry");
    let cached_status: Value = store.get(USER_STATUS_CACHE).await.expect("Status entry");
    let cached_benefits: Value = store.get(USER_BENEFITS_CACHE).await.expect("Benefits entry");
    assert_eq!(cached_public["resource"], "public-data");
    assert_eq!(cached_status["resource"], "user-status");
    assert_eq!(cached_benefits["resource"], "user-benefits");
}

#[tokio::test]
async fn test_credential_mode_follows_the_request_kind() {
    let addr = spawn_server(panel_backend()).await;
    let dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, _store) = spawn_mediator(format!("http://{addr}"), &dir);

    let public = handle
        .request(GET_PUBLIC_DATA)
        .await
        .await
        .expect("Public data reply should arrive");
    let status = handle
        .request(GET_USER_STATUS)
        .await
        .await
        .expect("User status reply should arrive");

    assert_eq!(
        public.data.as_ref().unwrap()["cookie"],
        Value::Null,
        "GET_PUBLIC_DATA is unauthenticated"
    );
    assert_eq!(
        status.data.as_ref().unwrap()["cookie"],
        "session=abc",
        "GET_USER_STATUS carries the session cookie"
    );
}

#[tokio::test]
async fn test_failure_envelope_is_relayed_to_the_caller() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, _store) = spawn_mediator("http://127.0.0.1:1".to_string(), &dir);

    let envelope = handle
        .request(GET_USER_STATUS)
        .await
        .await
        .expect("A failure still gets exactly one reply");

    assert!(!envelope.success);
    assert_eq!(envelope.error.as_deref(), Some(NETWORK_ERROR_MESSAGE));
}

#[tokio::test]
async fn test_startup_lifecycle_warms_the_status_cache() {
    let addr = spawn_server(panel_backend()).await;
    let dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, store) = spawn_mediator(format!("http://{addr}"), &dir);

    handle.notify_lifecycle(LifecycleEvent::Startup).await;

    let cached = wait_for_entry(&store, USER_STATUS_CACHE).await;
    assert_eq!(
        cached.expect("Startup should warm the status cache")["resource"],
        "user-status"
    );
    // The warm fetch touches only its own slot.
    assert!(store.get::<Value>(PUBLIC_DATA_CACHE).await.is_none());
}

#[tokio::test]
async fn test_installed_lifecycle_warms_the_status_cache() {
    let addr = spawn_server(panel_backend()).await;
    let dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, store) = spawn_mediator(format!("http://{addr}"), &dir);

    handle.notify_lifecycle(LifecycleEvent::Installed).await;

    let cached = wait_for_entry(&store, USER_STATUS_CACHE).await;
    assert!(cached.is_some(), "Install should warm the status cache");
}

#[tokio::test]
async fn test_concurrent_duplicate_requests_each_get_a_reply() {
    let addr = spawn_server(panel_backend()).await;
    let dir = TempDir::new().expect("Failed to create temp directory");
    let (handle, _store) = spawn_mediator(format!("http://{addr}"), &dir);

    let first = handle.request(GET_USER_STATUS).await;
    let second = handle.request(GET_USER_STATUS).await;

    let first = first.await.expect("First duplicate should get a reply");
    let second = second.await.expect("Second duplicate should get a reply");
    assert!(first.success);
    assert!(second.success);
}
