use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use inventorix_core::WarehouseId;
use inventorix_infra::access::{self, warehouses};
use inventorix_inventory::{WarehouseDraft, WarehousePatch};

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
    let res = warehouses::list(uow.as_mut(), ctx.user_id()).await;
    let rows = access::release(uow, res).await?;
    Ok(Json(rows.iter().map(dto::warehouse_to_json).collect()))
}

pub async fn create(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<UserContext>,
    JsonBody(body): JsonBody<WarehouseDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let mut uow = services.begin().await?;
    let res = warehouses::create(uow.as_mut(), ctx.user_id(), body).await;
    let warehouse = access::settle(uow, res).await?;
    Ok((StatusCode::CREATED, Json(dto::warehouse_to_json(&warehouse))))
}

pub async fn show(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id: WarehouseId = path_id(&id)?;
    let mut uow = services.begin().await?;
    let res = warehouses::get(uow.as_mut(), ctx.user_id(), id).await;
    let warehouse = access::release(uow, res).await?;
    Ok(Json(dto::warehouse_to_json(&warehouse)))
}

pub async fn update(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<WarehousePatch>,
) -> Result<Json<Value>, ApiError> {
    let id: WarehouseId = path_id(&id)?;
    let mut uow = services.begin().await?;
    let res = warehouses::patch(uow.as_mut(), ctx.user_id(), id, body).await;
    let warehouse = access::settle(uow, res).await?;
    Ok(Json(dto::warehouse_to_json(&warehouse)))
}

pub async fn remove(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: WarehouseId = path_id(&id)?;
    let mut uow = services.begin().await?;
    let res = warehouses::delete(uow.as_mut(), ctx.user_id(), id).await;
    access::settle(uow, res).await?;
    Ok(StatusCode::NO_CONTENT)
}
