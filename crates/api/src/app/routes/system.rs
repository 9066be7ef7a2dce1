use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

pub async fn index() -> Json<Value> {
    Json(json!({ "message": "Inventorix API" }))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
