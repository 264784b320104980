//! Pre-login email probe used by the sign-in form to pick a flow.

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use tracing::error;

use super::types::{UserExistsRequest, UserExistsResponse, error_response};
use crate::api::handlers::{normalize_email, valid_email};

#[utoipa::path(
    post,
    path = "/api/auth/user-exists",
    request_body = UserExistsRequest,
    responses(
        (status = 200, description = "Whether the email has an account and a local password", body = UserExistsResponse),
        (status = 400, description = "Malformed payload", body = super::types::ErrorBody)
    ),
    tag = "auth"
)]
pub async fn user_exists(
    pool: Extension<PgPool>,
    payload: Option<Json<UserExistsRequest>>,
) -> impl IntoResponse {
    let request: UserExistsRequest = match payload {
        Some(Json(payload)) => payload,
        None => return error_response(StatusCode::BAD_REQUEST, "Missing payload"),
    };

    let email_normalized = normalize_email(&request.email);
    if !valid_email(&email_normalized) {
        // Garbage input cannot name an account; skip the query.
        return (
            StatusCode::OK,
            Json(UserExistsResponse {
                exists: false,
                has_password: false,
            }),
        )
            .into_response();
    }

    match crate::store::credential_summary(&pool, &email_normalized).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(UserExistsResponse {
                exists: summary.exists,
                has_password: summary.has_password,
            }),
        )
            .into_response(),
        Err(err) => {
            error!("User existence check failed: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Lookup failed")
        }
    }
}
