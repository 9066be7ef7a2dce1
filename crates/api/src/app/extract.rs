use std::str::FromStr;

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use inventorix_infra::access::AccessError;

use crate::app::errors::ApiError;

/// `Json<T>` whose rejection is the API's own `invalid_body` error.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                let text = rejection.body_text();
                tracing::debug!("rejected body: {text}");
                Err(ApiError::InvalidBody(text))
            }
        }
    }
}

/// A path id that does not parse cannot name an existing row.
pub fn path_id<T: FromStr>(raw: &str) -> Result<T, ApiError> {
    raw.parse().map_err(|_| ApiError::Access(AccessError::NotFound))
}
