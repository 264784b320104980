//! OAuth authorization-code-with-PKCE handshake against the external
//! identity provider.
//!
//! Only `google` is recognized; the provider is parsed and rejected before
//! any handshake state is generated. The code exchange is the single network
//! call in the auth path and runs under the client timeout, so provider
//! unavailability surfaces as a recoverable error rather than a hang.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::pkce;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const EXCHANGE_TIMEOUT_SECONDS: u64 = 5;

/// Supported external identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
}

impl Provider {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = OAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Self::Google),
            other => Err(OAuthError::UnsupportedProvider(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{operation} failed with status {status}")]
    Provider {
        operation: &'static str,
        status: u16,
    },
    #[error("provider returned no verified email")]
    MissingEmail,
}

/// OAuth client configuration.
///
/// Required fields are constructor parameters; endpoint overrides exist for
/// tests against a local stub provider.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    client_id: String,
    redirect_uri: Url,
    auth_url: Url,
    token_url: Url,
    userinfo_url: Url,
    scopes: Vec<String>,
}

impl OAuthConfig {
    /// # Panics
    ///
    /// Never: the default endpoint URLs are statically valid.
    #[must_use]
    pub fn new(client_id: impl Into<String>, redirect_uri: Url) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri,
            auth_url: GOOGLE_AUTH_URL.parse().expect("valid default URL"),
            token_url: GOOGLE_TOKEN_URL.parse().expect("valid default URL"),
            userinfo_url: GOOGLE_USERINFO_URL.parse().expect("valid default URL"),
            scopes: vec!["openid".into(), "email".into(), "profile".into()],
        }
    }

    #[must_use]
    pub fn with_auth_url(mut self, url: Url) -> Self {
        self.auth_url = url;
        self
    }

    #[must_use]
    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    #[must_use]
    pub fn with_userinfo_url(mut self, url: Url) -> Self {
        self.userinfo_url = url;
        self
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }
}

/// Authorization URL plus the handshake secrets to stash in cookies.
pub struct HandshakeRequest {
    pub url: String,
    pub state: String,
    pub code_verifier: String,
}

/// Token response from the provider token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Identity assertion from the provider userinfo endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
}

impl UserInfo {
    /// The verified email this assertion vouches for, if any.
    #[must_use]
    pub fn verified_email(&self) -> Option<&str> {
        match (self.email.as_deref(), self.email_verified) {
            (Some(email), Some(true)) if !email.is_empty() => Some(email),
            _ => None,
        }
    }
}

/// OAuth client for the external provider.
pub struct AuthClient {
    config: OAuthConfig,
    http: Client,
}

impl AuthClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OAuthConfig) -> Result<Self, OAuthError> {
        let http = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(Duration::from_secs(EXCHANGE_TIMEOUT_SECONDS))
            .build()?;
        Ok(Self { config, http })
    }

    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Begin a handshake: fresh state/verifier and the provider redirect URL.
    ///
    /// # Errors
    ///
    /// Returns an error if random material cannot be generated.
    pub fn authorization_request(&self) -> anyhow::Result<HandshakeRequest> {
        let state = pkce::generate_state()?;
        let code_verifier = pkce::generate_code_verifier()?;
        let code_challenge = pkce::code_challenge(&code_verifier);
        let scope = self.config.scopes.join(" ");

        let mut url = self.config.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", self.config.redirect_uri.as_str())
            .append_pair("scope", &scope)
            .append_pair("state", &state)
            .append_pair("code_challenge", &code_challenge)
            .append_pair("code_challenge_method", "S256");

        Ok(HandshakeRequest {
            url: url.into(),
            state,
            code_verifier,
        })
    }

    /// Exchange an authorization code for tokens using the stored verifier.
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::Http` on network failure or timeout, or
    /// `OAuthError::Provider` if the token endpoint rejects the exchange.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, OAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("code_verifier", code_verifier),
        ];

        let response = self
            .http
            .post(self.config.token_url.clone())
            .form(&params)
            .send()
            .await?;

        let response = Self::ensure_success(response, "token exchange")?;
        Ok(response.json::<TokenResponse>().await?)
    }

    /// Fetch the identity assertion for an access token.
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::Http` on network failure, or
    /// `OAuthError::Provider` if the userinfo endpoint rejects the token.
    pub async fn fetch_user_info(&self, access_token: &str) -> Result<UserInfo, OAuthError> {
        let response = self
            .http
            .get(self.config.userinfo_url.clone())
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = Self::ensure_success(response, "userinfo request")?;
        Ok(response.json::<UserInfo>().await?)
    }

    fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, OAuthError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            // Provider error bodies stay server-side; callers redirect with
            // an opaque flag.
            Err(OAuthError::Provider {
                operation,
                status: status.as_u16(),
            })
        }
    }
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn test_client() -> Result<AuthClient> {
        let config = OAuthConfig::new(
            "test-client",
            "https://api.pulse.dev/api/auth/oauth/callback".parse()?,
        );
        Ok(AuthClient::new(config)?)
    }

    #[test]
    fn provider_parse() {
        assert_eq!("google".parse::<Provider>().ok(), Some(Provider::Google));
        assert!(matches!(
            "facebook".parse::<Provider>(),
            Err(OAuthError::UnsupportedProvider(name)) if name == "facebook"
        ));
        // Case-sensitive on purpose: the query parameter is machine-set.
        assert!("Google".parse::<Provider>().is_err());
    }

    #[test]
    fn authorization_request_contains_pkce_params() -> Result<()> {
        let client = test_client()?;
        let request = client.authorization_request()?;

        assert!(request.url.starts_with(GOOGLE_AUTH_URL));
        assert!(request.url.contains("response_type=code"));
        assert!(request.url.contains("client_id=test-client"));
        assert!(request.url.contains("code_challenge="));
        assert!(request.url.contains("code_challenge_method=S256"));
        assert!(request.url.contains(&format!("state={}", request.state)));
        // The verifier itself never appears in the redirect.
        assert!(!request.url.contains(&request.code_verifier));
        Ok(())
    }

    #[test]
    fn authorization_request_unique_per_call() -> Result<()> {
        let client = test_client()?;
        let first = client.authorization_request()?;
        let second = client.authorization_request()?;
        assert_ne!(first.state, second.state);
        assert_ne!(first.code_verifier, second.code_verifier);
        Ok(())
    }

    #[test]
    fn challenge_in_url_matches_verifier() -> Result<()> {
        let client = test_client()?;
        let request = client.authorization_request()?;
        let expected = crate::pkce::code_challenge(&request.code_verifier);
        assert!(request.url.contains(&format!("code_challenge={expected}")));
        Ok(())
    }

    #[test]
    fn verified_email_requires_verification_flag() {
        let mut info = UserInfo {
            sub: "provider-sub".to_string(),
            email: Some("a@b.com".to_string()),
            email_verified: Some(true),
            name: None,
        };
        assert_eq!(info.verified_email(), Some("a@b.com"));

        info.email_verified = Some(false);
        assert_eq!(info.verified_email(), None);

        info.email_verified = None;
        assert_eq!(info.verified_email(), None);
    }
}
