//! Runtime configuration for the porthole client
//!
//! Configuration comes from environment variables, with CLI overrides for
//! the two URLs. The signing secret is validated once at startup and the
//! resulting `Config` is immutable; nothing re-reads the environment later.

use std::env;

use thiserror::Error;

/// Environment variable holding the API base URL
pub const ENV_BASE_URL: &str = "PORTHOLE_API_BASE_URL";

/// Environment variable holding the login page URL
pub const ENV_LOGIN_URL: &str = "PORTHOLE_LOGIN_URL";

/// Environment variable holding the request signing secret
pub const ENV_SIGNATURE_SECRET: &str = "PORTHOLE_SIGNATURE_SECRET";

/// Environment variable holding the optional session cookie
pub const ENV_SESSION_COOKIE: &str = "PORTHOLE_SESSION_COOKIE";

/// Base URL used when none is configured
const DEFAULT_BASE_URL: &str = "https://app.porthole.dev";

/// Login page used when none is configured
const DEFAULT_LOGIN_URL: &str = "https://app.porthole.dev/login";

/// Errors raised while assembling the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The signing secret is missing or empty; outbound requests cannot be
    /// signed without it, so startup stops here.
    #[error("signing secret is not set (PORTHOLE_SIGNATURE_SECRET)")]
    MissingSecret,
}

/// Immutable runtime configuration, validated once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    /// Login page shown to logged-out users
    pub login_url: String,
    /// Shared secret for request signing; never transmitted
    pub secret: String,
    /// Session cookie attached to authenticated requests, if any
    pub session_cookie: Option<String>,
}

impl Config {
    /// Assembles a configuration from explicit values, validating the secret.
    pub fn new(
        base_url: impl Into<String>,
        login_url: impl Into<String>,
        secret: impl Into<String>,
        session_cookie: Option<String>,
    ) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(Self {
            base_url: base_url.into(),
            login_url: login_url.into(),
            secret,
            session_cookie,
        })
    }

    /// Loads the configuration from the environment.
    ///
    /// The signing secret must be present and non-empty. The URLs fall back
    /// to the hosted defaults when unset; the session cookie is optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let login_url = env::var(ENV_LOGIN_URL).unwrap_or_else(|_| DEFAULT_LOGIN_URL.to_string());
        let secret = env::var(ENV_SIGNATURE_SECRET).map_err(|_| ConfigError::MissingSecret)?;
        let session_cookie = env::var(ENV_SESSION_COOKIE).ok().filter(|c| !c.is_empty());
        Self::new(base_url, login_url, secret, session_cookie)
    }
}
