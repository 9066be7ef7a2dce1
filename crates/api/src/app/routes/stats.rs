use axum::{extract::Extension, Json};

use inventorix_infra::access::{self, stats as counts};
use inventorix_infra::store::OwnerCounts;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::UserContext;

pub async fn stats(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<UserContext>,
) -> Result<Json<OwnerCounts>, ApiError> {
    let mut uow = services.begin().await?;
    let res = counts::stats(uow.as_mut(), ctx.user_id()).await;
    Ok(Json(access::release(uow, res).await?))
}
