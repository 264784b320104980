//! Session endpoints: current identity and logout.

use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use tracing::{debug, error};

use super::{
    AuthState, cookies,
    types::{LogoutResponse, MeResponse, error_response},
};

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Identity derived from the session cookie", body = MeResponse),
        (status = 401, description = "Missing, expired, or invalid session token", body = super::types::ErrorBody)
    ),
    tag = "auth"
)]
pub async fn me(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let Some(token) = cookies::session_token(&headers) else {
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
    };

    match auth_state.tokens().verify(&token) {
        Ok(claims) => (
            StatusCode::OK,
            Json(MeResponse {
                id: claims.sub,
                email: claims.email,
                role: claims.role,
            }),
        )
            .into_response(),
        Err(err) => {
            debug!("Session token rejected: {err}");
            error_response(StatusCode::UNAUTHORIZED, "Unauthorized")
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = LogoutResponse)
    ),
    tag = "auth"
)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    // Stateless sessions: nothing to revoke server-side, just drop the cookie.
    let mut response_headers = HeaderMap::new();
    match cookies::clear_session_cookie(auth_state.config()) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build logout cookie: {err}"),
    }

    (
        StatusCode::OK,
        response_headers,
        Json(LogoutResponse { success: true }),
    )
}
