use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use inventorix_auth::TokenError;
use inventorix_infra::access::AccessError;
use inventorix_infra::store::StoreError;

/// Every way a request can fail, mapped to a status and a JSON body in one place.
#[derive(Debug)]
pub enum ApiError {
    Access(AccessError),
    MissingToken,
    InvalidToken,
    InvalidCredentials,
    InvalidBody(String),
    TokenIssue(TokenError),
}

impl From<AccessError> for ApiError {
    fn from(value: AccessError) -> Self {
        Self::Access(value)
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        Self::Access(value.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Access(err) => access_error_to_response(err),
            ApiError::MissingToken => json_error(StatusCode::UNAUTHORIZED, "unauthorized", "token missing"),
            ApiError::InvalidToken => json_error(StatusCode::UNAUTHORIZED, "unauthorized", "token invalid"),
            ApiError::InvalidCredentials => json_error(
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid credentials",
            ),
            ApiError::InvalidBody(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_body", msg),
            ApiError::TokenIssue(e) => {
                tracing::error!("token issue failed: {e}");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
            }
        }
    }
}

pub fn access_error_to_response(err: AccessError) -> Response {
    match err {
        AccessError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        AccessError::Conflict(msg) => json_error(StatusCode::BAD_REQUEST, "conflict", msg),
        AccessError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        AccessError::Store(e) => {
            tracing::warn!("store error: {e}");
            json_error(StatusCode::BAD_REQUEST, "store_error", e.to_string())
        }
        AccessError::Credential(e) => {
            tracing::error!("credential error: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
