use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::AppState;

pub mod models;
pub mod routes;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::health_handler))
        .route("/api/search", get(routes::search_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}
