use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::middleware::{self, AuthState};

pub mod categories;
pub mod products;
pub mod stats;
pub mod system;
pub mod users;
pub mod warehouses;

/// Router for registration, login and every bearer-protected resource.
///
/// `POST /users` and `POST /login` are public; every other route here runs
/// behind the bearer middleware.
pub fn router(auth: AuthState) -> Router {
    let auth = from_fn_with_state(auth, middleware::auth_middleware);

    let protected = Router::new()
        .nest("/categories", categories::router())
        .nest("/warehouses", warehouses::router())
        .nest("/products", products::router())
        .route("/stats", get(stats::stats))
        .route_layer(auth.clone());

    Router::new()
        .route("/login", post(users::login))
        .route(
            "/users",
            post(users::register).merge(
                get(users::me)
                    .delete(users::delete_me)
                    .route_layer(auth),
            ),
        )
        .merge(protected)
}
