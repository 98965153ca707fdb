pub mod auth;
pub mod events;
pub mod products;
pub mod ratings;
pub mod users;

use axum::{routing::get, Json, Router};
use serde_json::json;

use crate::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .nest("/v1/user", users::router())
        .nest("/v1/auth", auth::router())
        .nest("/v1/products", products::router())
        .nest("/v1/ratings", ratings::router())
        .nest("/v1/events", events::router())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Liveness")),
    tag = "Health"
)]
pub(crate) async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "status": "Running",
    }))
}
