//! Request/response types for auth endpoints.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::token::Role;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub user: LoginUser,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginUser {
    pub username: String,
    pub role: Role,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LogoutResponse {
    pub success: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MeResponse {
    pub id: String,
    pub email: String,
    pub role: Role,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserExistsRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserExistsResponse {
    pub exists: bool,
    pub has_password: bool,
}

/// Stable error shape for every API failure.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

/// `(status, {"error": ...})` response; the only way handlers report errors.
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_round_trips() -> Result<(), serde_json::Error> {
        let value = serde_json::json!({"email": "a@b.com", "password": "secret1"});
        let decoded: LoginRequest = serde_json::from_value(value)?;
        assert_eq!(decoded.email, "a@b.com");
        assert_eq!(decoded.password, "secret1");
        Ok(())
    }

    #[test]
    fn user_exists_response_is_camel_case() -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(UserExistsResponse {
            exists: true,
            has_password: false,
        })?;
        assert_eq!(value.get("hasPassword"), Some(&serde_json::json!(false)));
        assert!(value.get("has_password").is_none());
        Ok(())
    }

    #[test]
    fn login_response_embeds_role() -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(LoginResponse {
            user: LoginUser {
                username: "alice".to_string(),
                role: Role::Practitioner,
            },
        })?;
        assert_eq!(
            value.pointer("/user/role"),
            Some(&serde_json::json!("practitioner"))
        );
        Ok(())
    }
}
