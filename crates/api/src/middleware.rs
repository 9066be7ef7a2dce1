use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use inventorix_auth::TokenService;
use inventorix_infra::access::{self, users};
use inventorix_infra::store::Store;

use crate::app::errors::ApiError;
use crate::context::UserContext;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
    pub store: Arc<dyn Store>,
}

/// Resolve the bearer token to a live user and attach it as [`UserContext`].
///
/// Bad signature, expiry and a deleted user all answer the same 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers()).ok_or_else(|| {
        tracing::debug!("rejected request: no bearer token");
        ApiError::MissingToken
    })?;

    let user_id = state.tokens.verify(token).map_err(|e| {
        tracing::debug!(reason = %e, "rejected request: token verification failed");
        ApiError::InvalidToken
    })?;

    let mut uow = state.store.begin().await?;
    let found = users::find(uow.as_mut(), user_id).await;
    let user = access::release(uow, found).await?.ok_or_else(|| {
        tracing::debug!(user_id = %user_id, "rejected request: token subject no longer exists");
        ApiError::InvalidToken
    })?;

    req.extensions_mut().insert(UserContext::new(user));
    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
