//! Direct email/password login.

use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use sqlx::PgPool;
use tracing::{debug, error};

use super::{
    AuthState, cookies,
    types::{LoginRequest, LoginResponse, LoginUser, error_response},
};
use crate::api::handlers::{normalize_email, valid_email};
use crate::password::{PasswordCheck, verify_password};

// Never distinguish "email not found" from "wrong password".
const INVALID_CREDENTIALS: &str = "Invalid email or password";
const EXTERNAL_SIGN_IN: &str = "This account uses external sign-in";

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = LoginResponse),
        (status = 400, description = "Invalid credentials or OAuth-only account", body = super::types::ErrorBody),
        (status = 500, description = "Unexpected failure", body = super::types::ErrorBody)
    ),
    tag = "auth"
)]
pub async fn login(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return error_response(StatusCode::BAD_REQUEST, "Missing payload"),
    };

    let email_normalized = normalize_email(&request.email);
    if !valid_email(&email_normalized) || request.password.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, INVALID_CREDENTIALS);
    }

    let user = match crate::store::find_by_email(&pool, &email_normalized).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!("Login attempt for unknown email");
            return error_response(StatusCode::BAD_REQUEST, INVALID_CREDENTIALS);
        }
        Err(err) => {
            error!("Login lookup failed: {err}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Login failed");
        }
    };

    match verify_password(&request.password, user.password_hash.as_deref()) {
        PasswordCheck::Match => {}
        PasswordCheck::Mismatch => {
            debug!("Login attempt with wrong password");
            return error_response(StatusCode::BAD_REQUEST, INVALID_CREDENTIALS);
        }
        PasswordCheck::NoLocalPassword => {
            return error_response(StatusCode::BAD_REQUEST, EXTERNAL_SIGN_IN);
        }
    }

    let token = match auth_state
        .tokens()
        .issue(&user.id.to_string(), &user.email, user.role)
    {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to issue session token: {err}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Login failed");
        }
    };

    let mut response_headers = HeaderMap::new();
    match cookies::session_cookie(auth_state.config(), &token) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Login failed");
        }
    }

    debug!("Login successful");
    (
        StatusCode::OK,
        response_headers,
        Json(LoginResponse {
            user: LoginUser {
                username: user.username,
                role: user.role,
            },
        }),
    )
        .into_response()
}
