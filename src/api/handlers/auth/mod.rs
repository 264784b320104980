//! Authentication endpoints and their shared state.

pub(crate) mod cookies;
pub mod exists;
pub mod login;
pub mod oauth;
pub mod session;
pub mod types;

use std::sync::Arc;

use anyhow::Result;

use crate::oauth::{AuthClient, OAuthConfig};
use crate::token::{DEFAULT_TOKEN_TTL_SECONDS, TokenService};

const DEFAULT_HANDSHAKE_TTL_SECONDS: i64 = 600;

/// Knobs for the auth endpoints: cookie behavior and redirect targets.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    cookie_secure: bool,
    session_ttl_seconds: i64,
    handshake_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            cookie_secure: true,
            session_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            handshake_ttl_seconds: DEFAULT_HANDSHAKE_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_handshake_ttl_seconds(mut self, seconds: i64) -> Self {
        self.handshake_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub const fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    #[must_use]
    pub const fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub const fn handshake_ttl_seconds(&self) -> i64 {
        self.handshake_ttl_seconds
    }
}

/// Shared state for the auth handlers.
pub struct AuthState {
    config: AuthConfig,
    tokens: Arc<TokenService>,
    oauth: AuthClient,
}

impl AuthState {
    /// # Errors
    ///
    /// Returns an error if the OAuth HTTP client cannot be created.
    pub fn new(
        config: AuthConfig,
        oauth_config: OAuthConfig,
        tokens: Arc<TokenService>,
    ) -> Result<Self> {
        let oauth = AuthClient::new(oauth_config)?;
        Ok(Self {
            config,
            tokens,
            oauth,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    #[must_use]
    pub fn oauth(&self) -> &AuthClient {
        &self.oauth
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
