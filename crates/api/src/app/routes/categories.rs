use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use inventorix_core::CategoryId;
use inventorix_infra::access::{self, categories};
use inventorix_inventory::{CategoryDraft, CategoryPatch};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::extract::{path_id, JsonBody};
use crate::app::services::AppServices;
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).patch(update).delete(remove))
}

pub async fn list(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<UserContext>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let mut uow = services.begin().await?;
    let res = categories::list(uow.as_mut(), ctx.user_id()).await;
    let rows = access::release(uow, res).await?;
    Ok(Json(rows.iter().map(dto::category_to_json).collect()))
}

pub async fn create(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<UserContext>,
    JsonBody(body): JsonBody<CategoryDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let mut uow = services.begin().await?;
    let res = categories::create(uow.as_mut(), ctx.user_id(), body).await;
    let category = access::settle(uow, res).await?;
    Ok((StatusCode::CREATED, Json(dto::category_to_json(&category))))
}

pub async fn show(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id: CategoryId = path_id(&id)?;
    let mut uow = services.begin().await?;
    let res = categories::get(uow.as_mut(), ctx.user_id(), id).await;
    let category = access::release(uow, res).await?;
    Ok(Json(dto::category_to_json(&category)))
}

pub async fn update(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<CategoryPatch>,
) -> Result<Json<Value>, ApiError> {
    let id: CategoryId = path_id(&id)?;
    let mut uow = services.begin().await?;
    let res = categories::patch(uow.as_mut(), ctx.user_id(), id, body).await;
    let category = access::settle(uow, res).await?;
    Ok(Json(dto::category_to_json(&category)))
}

pub async fn remove(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: CategoryId = path_id(&id)?;
    let mut uow = services.begin().await?;
    let res = categories::delete(uow.as_mut(), ctx.user_id(), id).await;
    access::settle(uow, res).await?;
    Ok(StatusCode::NO_CONTENT)
}
