//! Session token issuance and verification.
//!
//! Tokens are stateless `HS256` JWTs carrying the identity claims the rest of
//! the platform trusts. The signing secret is injected at construction time
//! so tests can run with per-case secrets; nothing in this module reads
//! ambient configuration.

use std::time::SystemTime;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default session lifetime for direct login: 7 days.
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// User role for path authorization.
///
/// Adding a role is a compile-time change: the gatekeeper's prefix table
/// matches exhaustively on this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform administration.
    Admin,
    /// Regular member.
    User,
    /// Verified health practitioner.
    Practitioner,
}

impl Role {
    /// Landing path after sign-in for this role.
    #[must_use]
    pub const fn home_path(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::User => "/user",
            Self::Practitioner => "/practitioner",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Practitioner => "practitioner",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "practitioner" => Ok(Self::Practitioner),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// Identity claims encoded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: stable user id (UUID).
    pub sub: String,
    /// Email, also used as the realtime-presence client identifier.
    pub email: String,
    /// Role driving path authorization.
    pub role: Role,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds). A token with `exp <= now` is invalid.
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Signature mismatch, malformed structure, wrong algorithm, or expiry.
    /// Collapsed on purpose: callers surface all of these as `Unauthorized`.
    #[error("invalid token")]
    Invalid,
    /// Signature verified but the token is outside its validity window.
    #[error("expired token")]
    Expired,
    #[error("failed to encode token: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

/// Issues and verifies session tokens with a single symmetric secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: i64,
    validation: Validation,
}

impl TokenService {
    /// Build a token service from the configured signing secret.
    ///
    /// The service commits to `HS256`: tokens signed with any other algorithm
    /// fail verification regardless of their signature.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_seconds: i64) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Expiry is checked explicitly in verify() so the boundary is ours to
        // define; jsonwebtoken still rejects tokens without an exp claim.
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
            ttl_seconds,
            validation,
        }
    }

    /// Mint a signed session token for the given identity.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if serialization or signing fails.
    pub fn issue(&self, subject: &str, email: &str, role: Role) -> Result<String, TokenError> {
        let now = now_unix_seconds();
        let claims = Claims {
            sub: subject.to_string(),
            email: email.to_string(),
            role,
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Verify a candidate token and return its claims.
    ///
    /// Side-effect free: repeated verification of the same token yields the
    /// same result, modulo expiry.
    ///
    /// # Errors
    ///
    /// `TokenError::Expired` when the signature is valid but `exp` has
    /// passed (a token expiring exactly now is rejected), `TokenError::Invalid`
    /// for every other failure. Raw parser errors never escape.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| TokenError::Invalid)?;

        if data.claims.exp <= now_unix_seconds() {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

/// Unix seconds for claim timestamps.
pub(crate) fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&SecretString::from(secret.to_string()), 3600)
    }

    #[test]
    fn issue_verify_round_trip() -> Result<(), TokenError> {
        let tokens = service("test-secret");
        let token = tokens.issue("user-1", "a@b.com", Role::User)?;
        let claims = tokens.verify(&token)?;
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp, claims.iat + 3600);
        Ok(())
    }

    #[test]
    fn foreign_secret_rejected() -> Result<(), TokenError> {
        let token = service("secret-one").issue("user-1", "a@b.com", Role::Admin)?;
        let result = service("secret-two").verify(&token);
        assert!(matches!(result, Err(TokenError::Invalid)));
        Ok(())
    }

    #[test]
    fn expired_token_rejected() -> Result<(), jsonwebtoken::errors::Error> {
        let secret = SecretString::from("test-secret".to_string());
        let tokens = TokenService::new(&secret, 3600);
        let now = now_unix_seconds();
        let claims = Claims {
            sub: "user-1".to_string(),
            email: "a@b.com".to_string(),
            role: Role::User,
            iat: now - 120,
            exp: now - 60,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )?;
        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
        Ok(())
    }

    #[test]
    fn expiry_boundary_is_exclusive() -> Result<(), jsonwebtoken::errors::Error> {
        // exp == now must already be invalid.
        let tokens = service("test-secret");
        let now = now_unix_seconds();
        let claims = Claims {
            sub: "user-1".to_string(),
            email: "a@b.com".to_string(),
            role: Role::User,
            iat: now - 3600,
            exp: now,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )?;
        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
        Ok(())
    }

    #[test]
    fn other_algorithm_rejected() -> Result<(), jsonwebtoken::errors::Error> {
        // Same secret, different algorithm: algorithm confusion is a failure.
        let tokens = service("test-secret");
        let now = now_unix_seconds();
        let claims = Claims {
            sub: "user-1".to_string(),
            email: "a@b.com".to_string(),
            role: Role::User,
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )?;
        assert!(matches!(tokens.verify(&token), Err(TokenError::Invalid)));
        Ok(())
    }

    #[test]
    fn garbage_token_rejected() {
        let tokens = service("test-secret");
        assert!(matches!(
            tokens.verify("not.a.token"),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(tokens.verify(""), Err(TokenError::Invalid)));
    }

    #[test]
    fn verify_is_idempotent() -> Result<(), TokenError> {
        let tokens = service("test-secret");
        let token = tokens.issue("user-1", "a@b.com", Role::Practitioner)?;
        let first = tokens.verify(&token)?;
        let second = tokens.verify(&token)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn role_parse_and_display() {
        for role in [Role::Admin, Role::User, Role::Practitioner] {
            let parsed: Role = role.as_str().parse().expect("round trip");
            assert_eq!(parsed, role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn role_serde_lowercase() -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(Role::Practitioner)?;
        assert_eq!(value, serde_json::json!("practitioner"));
        Ok(())
    }
}
