//! Persistent cache for last-known-good API payloads
//!
//! One JSON file per logical cache key. An entry holds the raw `data`
//! payload of the most recent successful fetch for its resource: entries are
//! written only on success and removed on any failure, so a present entry is
//! always last-known-good. There is no partial or merge update.

mod store;

pub use store::CacheStore;

/// Cache key for the public announcement payload
pub const PUBLIC_DATA_CACHE: &str = "public_data_cache";

/// Cache key for the user status payload
pub const USER_STATUS_CACHE: &str = "user_status_cache";

/// Cache key for the user benefits payload
pub const USER_BENEFITS_CACHE: &str = "user_benefits_cache";
