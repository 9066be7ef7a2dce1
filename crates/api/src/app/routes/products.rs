use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use inventorix_core::ProductId;
use inventorix_infra::access::{self, products};
use inventorix_inventory::{ProductDraft, ProductPatch};

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
    let res = products::list(uow.as_mut(), ctx.user_id()).await;
    let rows = access::release(uow, res).await?;
    Ok(Json(rows.iter().map(dto::product_to_json).collect()))
}

pub async fn create(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<UserContext>,
    JsonBody(body): JsonBody<ProductDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let mut uow = services.begin().await?;
    let res = products::create(uow.as_mut(), ctx.user_id(), body).await;
    let product = access::settle(uow, res).await?;
    Ok((StatusCode::CREATED, Json(dto::product_to_json(&product))))
}

pub async fn show(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id: ProductId = path_id(&id)?;
    let mut uow = services.begin().await?;
    let res = products::get(uow.as_mut(), ctx.user_id(), id).await;
    let product = access::release(uow, res).await?;
    Ok(Json(dto::product_to_json(&product)))
}

pub async fn update(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<ProductPatch>,
) -> Result<Json<Value>, ApiError> {
    let id: ProductId = path_id(&id)?;
    let mut uow = services.begin().await?;
    let res = products::patch(uow.as_mut(), ctx.user_id(), id, body).await;
    let product = access::settle(uow, res).await?;
    Ok(Json(dto::product_to_json(&product)))
}

pub async fn remove(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: ProductId = path_id(&id)?;
    let mut uow = services.begin().await?;
    let res = products::delete(uow.as_mut(), ctx.user_id(), id).await;
    access::settle(uow, res).await?;
    Ok(StatusCode::NO_CONTENT)
}
