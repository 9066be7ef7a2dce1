use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use inventorix_auth::UserDraft;
use inventorix_infra::access::{self, users};

use crate::app::dto::{self, LoginRequest};
use crate::app::errors::ApiError;
use crate::app::extract::JsonBody;
use crate::app::services::AppServices;
use crate::context::UserContext;

pub async fn register(
    Extension(services): Extension<AppServices>,
    JsonBody(body): JsonBody<UserDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let new = users::prepare(body)?;
    let mut uow = services.begin().await?;
    let res = users::register(uow.as_mut(), new).await;
    let user = access::settle(uow, res).await?;
    Ok((StatusCode::CREATED, Json(dto::user_to_json(&user))))
}

pub async fn login(
    Extension(services): Extension<AppServices>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(username), Some(password)) = (body.username, body.password) else {
        return Err(ApiError::InvalidCredentials);
    };

    let mut uow = services.begin().await?;
    let res = users::by_username(uow.as_mut(), &username).await;
    let candidate = access::release(uow, res).await?;
    let user = users::authenticate(candidate, &password).ok_or_else(|| {
        tracing::debug!("login rejected");
        ApiError::InvalidCredentials
    })?;

    let token = services.tokens.issue(user.id).map_err(ApiError::TokenIssue)?;
    tracing::info!(user_id = %user.id, "login succeeded");

    Ok(Json(json!({
        "token": token,
        "user": dto::user_to_json(&user),
    })))
}

pub async fn me(Extension(ctx): Extension<UserContext>) -> Json<Value> {
    Json(dto::user_to_json(ctx.user()))
}

pub async fn delete_me(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<UserContext>,
) -> Result<StatusCode, ApiError> {
    let mut uow = services.begin().await?;
    let res = users::delete(uow.as_mut(), ctx.user_id()).await;
    access::settle(uow, res).await?;
    Ok(StatusCode::NO_CONTENT)
}
