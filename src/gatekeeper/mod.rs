//! Per-request authentication and authorization checkpoint.
//!
//! Runs once for every incoming request, before any protected handler:
//! public routes pass through, everything else needs a valid session token
//! and a role whose prefix table covers the request path. Denials redirect
//! to the sign-in surface so browser navigations land somewhere usable;
//! the unauthenticated/unauthorized distinction is kept internally for
//! logging and tests even though the redirect is identical.
//!
//! The gatekeeper is stateless: every request is classified independently.

pub mod policy;

use std::sync::Arc;

use axum::{
    extract::{Extension, Request},
    http::{HeaderValue, StatusCode, header::LOCATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::token::{Claims, Role, TokenService};
use self::policy::{SIGN_IN_PATH, is_public, normalize_path, path_allowed};

/// Verified identity headers attached to forwarded requests. Inbound values
/// are always stripped first: callers cannot impersonate by setting them.
pub const HEADER_USER_ID: &str = "x-pulse-user-id";
pub const HEADER_USER_EMAIL: &str = "x-pulse-user-email";
pub const HEADER_USER_ROLE: &str = "x-pulse-user-role";

/// Why a request was turned away. Both variants surface as the same
/// redirect; only logs and tests see the difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No session cookie, or its token failed verification.
    Unauthenticated,
    /// Valid session, but the role's prefix table does not cover the path.
    Unauthorized,
}

/// Terminal classification of a request.
#[derive(Debug)]
pub enum Verdict {
    /// Public route: forward without identity.
    Public,
    /// Authenticated and authorized: forward with identity headers.
    Forward(Claims),
    /// Already signed in and asking for the sign-in page.
    RedirectHome(Role),
    /// Turned away to the sign-in surface.
    RedirectToSignIn(DenyReason),
}

/// Classify a request path against the session token, if any.
///
/// Pure with respect to the request: no state survives between calls.
#[must_use]
pub fn classify(path: &str, token: Option<&str>, tokens: &TokenService) -> Verdict {
    let path = normalize_path(path);

    // The sign-in page is public, but an authenticated caller is bounced to
    // their role's home instead of seeing it again.
    if path == SIGN_IN_PATH {
        if let Some(token) = token {
            if let Ok(claims) = tokens.verify(token) {
                return Verdict::RedirectHome(claims.role);
            }
        }
        return Verdict::Public;
    }

    if is_public(path) {
        return Verdict::Public;
    }

    let Some(token) = token else {
        return Verdict::RedirectToSignIn(DenyReason::Unauthenticated);
    };

    let Ok(claims) = tokens.verify(token) else {
        return Verdict::RedirectToSignIn(DenyReason::Unauthenticated);
    };

    if path_allowed(claims.role, path) {
        Verdict::Forward(claims)
    } else {
        Verdict::RedirectToSignIn(DenyReason::Unauthorized)
    }
}

/// Axum middleware wrapping the whole router.
pub async fn gatekeeper(
    Extension(tokens): Extension<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let token = crate::api::handlers::auth::cookies::session_token(request.headers());

    strip_identity_headers(&mut request);

    match classify(&path, token.as_deref(), &tokens) {
        Verdict::Public => next.run(request).await,
        Verdict::Forward(claims) => {
            attach_identity_headers(&mut request, &claims);
            next.run(request).await
        }
        Verdict::RedirectHome(role) => {
            debug!(path, role = %role, "authenticated caller on sign-in page");
            found(role.home_path())
        }
        Verdict::RedirectToSignIn(reason) => {
            debug!(path, ?reason, "request denied");
            found(SIGN_IN_PATH)
        }
    }
}

/// `302 Found` — page flows expect the classic redirect, not axum's 303.
fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

fn strip_identity_headers(request: &mut Request) {
    let headers = request.headers_mut();
    headers.remove(HEADER_USER_ID);
    headers.remove(HEADER_USER_EMAIL);
    headers.remove(HEADER_USER_ROLE);
}

fn attach_identity_headers(request: &mut Request, claims: &Claims) {
    let headers = request.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&claims.sub) {
        headers.insert(HEADER_USER_ID, value);
    }
    if let Ok(value) = HeaderValue::from_str(&claims.email) {
        headers.insert(HEADER_USER_EMAIL, value);
    }
    headers.insert(HEADER_USER_ROLE, HeaderValue::from_static(claims.role.as_str()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn tokens() -> TokenService {
        TokenService::new(&SecretString::from("gate-secret".to_string()), 3600)
    }

    fn token_for(tokens: &TokenService, role: Role) -> String {
        tokens
            .issue("user-1", "a@b.com", role)
            .expect("issuing test token")
    }

    #[test]
    fn public_route_passes_without_cookie() {
        assert!(matches!(
            classify("/sign-in", None, &tokens()),
            Verdict::Public
        ));
        assert!(matches!(
            classify("/api/auth/login", None, &tokens()),
            Verdict::Public
        ));
    }

    #[test]
    fn missing_cookie_is_unauthenticated() {
        assert!(matches!(
            classify("/admin", None, &tokens()),
            Verdict::RedirectToSignIn(DenyReason::Unauthenticated)
        ));
    }

    #[test]
    fn invalid_token_is_unauthenticated() {
        assert!(matches!(
            classify("/user", Some("garbage"), &tokens()),
            Verdict::RedirectToSignIn(DenyReason::Unauthenticated)
        ));
    }

    #[test]
    fn foreign_secret_is_unauthenticated() {
        let other = TokenService::new(&SecretString::from("other".to_string()), 3600);
        let token = token_for(&other, Role::User);
        assert!(matches!(
            classify("/user", Some(&token), &tokens()),
            Verdict::RedirectToSignIn(DenyReason::Unauthenticated)
        ));
    }

    #[test]
    fn wrong_role_is_unauthorized_not_unauthenticated() {
        let tokens = tokens();
        let token = token_for(&tokens, Role::User);
        assert!(matches!(
            classify("/admin", Some(&token), &tokens),
            Verdict::RedirectToSignIn(DenyReason::Unauthorized)
        ));
        assert!(matches!(
            classify("/admin/users/42", Some(&token), &tokens),
            Verdict::RedirectToSignIn(DenyReason::Unauthorized)
        ));
    }

    #[test]
    fn matching_role_is_forwarded_with_claims() {
        let tokens = tokens();
        let token = token_for(&tokens, Role::User);
        match classify("/user/quests/", Some(&token), &tokens) {
            Verdict::Forward(claims) => {
                assert_eq!(claims.sub, "user-1");
                assert_eq!(claims.role, Role::User);
            }
            other => panic!("expected forward, got {other:?}"),
        }
    }

    #[test]
    fn authenticated_sign_in_redirects_home() {
        let tokens = tokens();
        for role in [Role::Admin, Role::User, Role::Practitioner] {
            let token = token_for(&tokens, role);
            match classify("/sign-in", Some(&token), &tokens) {
                Verdict::RedirectHome(home) => assert_eq!(home, role),
                other => panic!("expected home redirect, got {other:?}"),
            }
        }
    }

    #[test]
    fn sign_in_with_stale_token_stays_public() {
        // A broken cookie must not lock the user out of the sign-in page.
        assert!(matches!(
            classify("/sign-in", Some("stale"), &tokens()),
            Verdict::Public
        ));
    }
}
