use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::rating::{RatingCreateRequest, RatingUpdateRequest};
use crate::response::{created, ok, ApiResponse};
use crate::services;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(add_rating))
        .route("/products/{productId}/ratings", get(list_product_ratings))
        .route("/{ratingId}", put(update_rating).delete(delete_rating))
}

fn parse_id(id: &str, field: &str, message: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::invalid_field(field, message))
}

#[utoipa::path(
    post,
    path = "/v1/ratings",
    request_body = RatingCreateRequest,
    responses(
        (status = 201, description = "Rating created", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
    ),
    security(("bearer" = [])),
    tag = "Ratings"
)]
pub(crate) async fn add_rating(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<RatingCreateRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("add_rating:handler:invoke");
    req.validate()?;

    let rating = services::ratings::create(&state.db, auth.user.id, &req).await?;
    Ok(created(rating))
}

#[utoipa::path(
    get,
    path = "/v1/ratings/products/{productId}/ratings",
    params(("productId" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Ratings for the product", body = ApiResponse),
        (status = 400, description = "Malformed id", body = ApiResponse),
    ),
    tag = "Ratings"
)]
pub(crate) async fn list_product_ratings(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("list_product_ratings:handler:invoke");
    let product_id = parse_id(&product_id, "productId", "Invalid product ID format")?;
    let ratings = services::ratings::list_by_product(&state.db, product_id).await?;
    Ok(ok(ratings))
}

#[utoipa::path(
    put,
    path = "/v1/ratings/{ratingId}",
    params(("ratingId" = String, Path, description = "Rating id")),
    request_body = RatingUpdateRequest,
    responses(
        (status = 200, description = "Updated rating", body = ApiResponse),
        (status = 404, description = "No such rating", body = ApiResponse),
    ),
    security(("bearer" = [])),
    tag = "Ratings"
)]
pub(crate) async fn update_rating(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(rating_id): Path<String>,
    Json(req): Json<RatingUpdateRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("update_rating:handler:invoke");
    let rating_id = parse_id(&rating_id, "ratingId", "Invalid rating ID format")?;
    req.validate()?;

    let rating = services::ratings::update(&state.db, rating_id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("Rating not found"))?;
    Ok(ok(rating))
}

#[utoipa::path(
    delete,
    path = "/v1/ratings/{ratingId}",
    params(("ratingId" = String, Path, description = "Rating id")),
    responses(
        (status = 200, description = "Deleted (idempotent)", body = ApiResponse),
        (status = 400, description = "Malformed id", body = ApiResponse),
    ),
    security(("bearer" = [])),
    tag = "Ratings"
)]
pub(crate) async fn delete_rating(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(rating_id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("delete_rating:handler:invoke");
    let rating_id = parse_id(&rating_id, "ratingId", "Invalid rating ID format")?;
    services::ratings::delete(&state.db, rating_id).await?;
    Ok(ok(json!({ "message": "Rating deleted successfully" })))
}
