//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store and token service wiring
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses
//! - `extract.rs`: body and path extractors that answer with those error responses

use axum::{routing::get, Extension, Router};
use tower_http::cors::CorsLayer;

use crate::middleware::AuthState;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the black-box tests).
pub fn build_app(services: AppServices) -> Router {
    let auth_state = AuthState {
        tokens: services.tokens.clone(),
        store: services.store.clone(),
    };

    Router::new()
        .route("/", get(routes::system::index))
        .route("/health", get(routes::system::health))
        .merge(routes::router(auth_state))
        .layer(Extension(services))
        .layer(CorsLayer::permissive())
}
