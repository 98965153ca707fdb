use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use validator::Validate;

use crate::error::AppError;
use crate::mailer::welcome_email;
use crate::middleware::auth::AuthUser;
use crate::models::user::{LoginRequest, SignupRequest};
use crate::models::PageQuery;
use crate::response::{created, ok, ApiResponse};
use crate::services;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/users", get(list_users))
}

#[utoipa::path(
    post,
    path = "/v1/user/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 500, description = "Creation failed", body = ApiResponse),
    ),
    tag = "Users"
)]
pub(crate) async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("signup:handler:invoke");
    req.validate()?;

    let password_hash = services::auth::hash_password(&req.password)?;
    let user_id = services::users::create_user(&state.db, &req, &password_hash).await?;

    // Fire-and-forget; the worker logs its own outcome.
    state
        .mailer
        .send(welcome_email(&req.email, &req.first_name));

    Ok(created(json!({
        "message": "User created successfully",
        "userId": user_id,
    })))
}

#[utoipa::path(
    post,
    path = "/v1/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 401, description = "Invalid credentials", body = ApiResponse),
    ),
    tag = "Users"
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("login:handler:invoke");
    req.validate()?;

    let tokens = services::auth::login(&state.db, &state.config, &req.email, &req.password).await?;
    Ok(ok(tokens))
}

#[utoipa::path(
    get,
    path = "/v1/user/users",
    params(PageQuery),
    responses(
        (status = 200, description = "Paginated user projection", body = ApiResponse),
        (status = 401, description = "Missing or invalid token", body = ApiResponse),
    ),
    security(("bearer" = [])),
    tag = "Users"
)]
pub(crate) async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("list_users:handler:invoke");
    let (user_list, total_counts) = services::users::list_users(&state.db, &page).await?;
    Ok(ok(json!({
        "userList": user_list,
        "totalCounts": total_counts,
    })))
}
