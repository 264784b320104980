//! OAuth handshake endpoints: provider redirect and callback.
//!
//! Failures redirect back to the sign-in surface with an opaque error flag;
//! provider error bodies never reach the browser. The handshake cookies are
//! cleared on every callback outcome so a consumed state/verifier pair
//! cannot be replayed.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{LOCATION, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{debug, error, info, warn};
use utoipa::IntoParams;

use super::{AuthConfig, AuthState, cookies, types::error_response};
use crate::api::handlers::normalize_email;
use crate::gatekeeper::policy::SIGN_IN_PATH;
use crate::oauth::Provider;

#[derive(Deserialize, IntoParams, Debug)]
pub struct StartParams {
    /// External provider identifier; only `google` is recognized.
    pub provider: Option<String>,
}

#[derive(Deserialize, IntoParams, Debug)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Error indicator set by the provider when the user denied consent.
    pub error: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/auth/oauth",
    params(StartParams),
    responses(
        (status = 302, description = "Redirect to the provider with handshake cookies set"),
        (status = 400, description = "Unsupported provider", body = super::types::ErrorBody)
    ),
    tag = "auth"
)]
pub async fn oauth_start(
    auth_state: Extension<Arc<AuthState>>,
    Query(params): Query<StartParams>,
) -> impl IntoResponse {
    // Reject unknown providers before any handshake state exists.
    let provider = match params.provider.as_deref().unwrap_or_default().parse::<Provider>() {
        Ok(provider) => provider,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Unsupported provider"),
    };

    let handshake = match auth_state.oauth().authorization_request() {
        Ok(handshake) => handshake,
        Err(err) => {
            error!("Failed to start OAuth handshake: {err}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "OAuth start failed");
        }
    };

    let (state_cookie, verifier_cookie) = match cookies::handshake_cookies(
        auth_state.config(),
        &handshake.state,
        &handshake.code_verifier,
    ) {
        Ok(pair) => pair,
        Err(err) => {
            error!("Failed to build handshake cookies: {err}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "OAuth start failed");
        }
    };

    debug!(provider = %provider, "redirecting to provider");
    found_with_cookies(&handshake.url, vec![state_cookie, verifier_cookie])
}

#[utoipa::path(
    get,
    path = "/api/auth/oauth/callback",
    params(CallbackParams),
    responses(
        (status = 302, description = "Session cookie set and redirect into the app, or redirect to sign-in with an error flag")
    ),
    tag = "auth"
)]
pub async fn oauth_callback(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    let config = auth_state.config();

    if let Some(provider_error) = &params.error {
        warn!(error = %provider_error, "provider returned an error");
        return deny(config, "provider_error");
    }

    // Anti-CSRF: the state echoed by the provider must equal the cookie copy.
    // A mismatch is fatal for this handshake and nothing is exchanged.
    let Some(stored_state) = cookies::cookie_value(&headers, cookies::STATE_COOKIE_NAME) else {
        warn!("callback without handshake state cookie");
        return deny(config, "state_mismatch");
    };
    let Some(returned_state) = params.state.as_deref().filter(|state| !state.is_empty()) else {
        warn!("callback without state parameter");
        return deny(config, "state_mismatch");
    };
    if returned_state != stored_state {
        warn!("OAuth state mismatch");
        return deny(config, "state_mismatch");
    }

    let Some(code_verifier) = cookies::cookie_value(&headers, cookies::VERIFIER_COOKIE_NAME) else {
        warn!("callback without code verifier cookie");
        return deny(config, "state_mismatch");
    };
    let Some(code) = params.code.as_deref().filter(|code| !code.is_empty()) else {
        warn!("callback without authorization code");
        return deny(config, "provider_error");
    };

    let token_response = match auth_state.oauth().exchange_code(code, &code_verifier).await {
        Ok(response) => response,
        Err(err) => {
            error!("Code exchange failed: {err}");
            return deny(config, "provider_error");
        }
    };

    let user_info = match auth_state
        .oauth()
        .fetch_user_info(&token_response.access_token)
        .await
    {
        Ok(info) => info,
        Err(err) => {
            error!("Userinfo request failed: {err}");
            return deny(config, "provider_error");
        }
    };

    let Some(email) = user_info.verified_email() else {
        warn!("provider assertion carries no verified email");
        return deny(config, "provider_error");
    };

    let email_normalized = normalize_email(email);
    let user =
        match crate::store::resolve_or_create_oauth_user(&pool, email, &email_normalized).await {
            Ok(user) => user,
            Err(err) => {
                error!("Account resolution failed: {err}");
                return deny(config, "sign_in_failed");
            }
        };

    // From here on the session is identical to direct login.
    let token = match auth_state
        .tokens()
        .issue(&user.id.to_string(), &user.email, user.role)
    {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to issue session token: {err}");
            return deny(config, "sign_in_failed");
        }
    };

    let session_cookie = match cookies::session_cookie(config, &token) {
        Ok(cookie) => cookie,
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return deny(config, "sign_in_failed");
        }
    };

    let mut set_cookies = vec![session_cookie];
    set_cookies.extend(clear_cookies(config));

    info!(user_id = %user.id, "OAuth login successful");
    found_with_cookies(user.role.home_path(), set_cookies)
}

/// Redirect to sign-in with an opaque flag, clearing the handshake cookies.
fn deny(config: &AuthConfig, flag: &str) -> Response {
    found_with_cookies(
        &format!("{SIGN_IN_PATH}?error={flag}"),
        clear_cookies(config),
    )
}

fn clear_cookies(config: &AuthConfig) -> Vec<HeaderValue> {
    match cookies::clear_handshake_cookies(config) {
        Ok((state, verifier)) => vec![state, verifier],
        Err(err) => {
            error!("Failed to build handshake removal cookies: {err}");
            Vec::new()
        }
    }
}

/// `302 Found` with any number of `Set-Cookie` headers attached.
fn found_with_cookies(location: &str, set_cookies: Vec<HeaderValue>) -> Response {
    let Ok(location) = HeaderValue::from_str(location) else {
        error!("Redirect target is not a valid header value");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    let mut headers = HeaderMap::new();
    headers.insert(LOCATION, location);
    for cookie in set_cookies {
        headers.append(SET_COOKIE, cookie);
    }
    (StatusCode::FOUND, headers).into_response()
}
