use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::product::{
    ProductCreateRequest, ProductFilterQuery, ProductSearchQuery, ProductUpdateRequest,
};
use crate::models::PageQuery;
use crate::response::{created, ok, ApiResponse};
use crate::services;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/search", get(search_products))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::invalid_field("id", "Invalid product ID format"))
}

#[utoipa::path(
    post,
    path = "/v1/products",
    request_body = ProductCreateRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 403, description = "Admin role required", body = ApiResponse),
    ),
    security(("bearer" = [])),
    tag = "Products"
)]
pub(crate) async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ProductCreateRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("create_product:handler:invoke");
    auth.require_admin()?;
    req.validate()?;

    let product = services::products::create(&state.db, &req).await?;
    Ok(created(product))
}

#[utoipa::path(
    get,
    path = "/v1/products",
    params(PageQuery, ProductFilterQuery),
    responses(
        (status = 200, description = "Paginated product list with filter-wide total", body = ApiResponse),
    ),
    tag = "Products"
)]
pub(crate) async fn list_products(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<ProductFilterQuery>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("list_products:handler:invoke");
    let page_data = services::products::list(&state.db, &page, &filter).await?;
    Ok(ok(page_data))
}

#[utoipa::path(
    get,
    path = "/v1/products/search",
    params(ProductSearchQuery),
    responses(
        (status = 200, description = "Products matching the search", body = ApiResponse),
    ),
    tag = "Products"
)]
pub(crate) async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<ProductSearchQuery>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("search_products:handler:invoke");
    let products = services::products::search(&state.db, &query).await?;
    Ok(ok(products))
}

#[utoipa::path(
    get,
    path = "/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = ApiResponse),
        (status = 400, description = "Malformed id", body = ApiResponse),
        (status = 404, description = "No such product", body = ApiResponse),
    ),
    tag = "Products"
)]
pub(crate) async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("get_product:handler:invoke");
    let id = parse_id(&id)?;
    let product = services::products::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;
    Ok(ok(product))
}

#[utoipa::path(
    put,
    path = "/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body = ProductUpdateRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 403, description = "Admin role required", body = ApiResponse),
        (status = 404, description = "No such product", body = ApiResponse),
    ),
    security(("bearer" = [])),
    tag = "Products"
)]
pub(crate) async fn update_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<ProductUpdateRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("update_product:handler:invoke");
    auth.require_admin()?;
    let id = parse_id(&id)?;
    req.validate_payload()?;

    let product = services::products::update(&state.db, id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;
    Ok(ok(product))
}

#[utoipa::path(
    delete,
    path = "/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Deleted (idempotent)", body = ApiResponse),
        (status = 400, description = "Malformed id", body = ApiResponse),
        (status = 403, description = "Admin role required", body = ApiResponse),
    ),
    security(("bearer" = [])),
    tag = "Products"
)]
pub(crate) async fn delete_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("delete_product:handler:invoke");
    auth.require_admin()?;
    let id = parse_id(&id)?;

    // Succeeds whether or not the row existed.
    services::products::delete(&state.db, id).await?;
    Ok(ok(json!({ "message": "Product deleted successfully" })))
}
