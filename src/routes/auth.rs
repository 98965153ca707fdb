use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use validator::Validate;

use crate::error::AppError;
use crate::models::user::RefreshTokenRequest;
use crate::response::{ok, ApiResponse};
use crate::services;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/refreshToken", post(refresh_token))
}

#[utoipa::path(
    post,
    path = "/v1/auth/refreshToken",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Rotated token pair", body = ApiResponse),
        (status = 400, description = "Missing refresh token", body = ApiResponse),
        (status = 401, description = "Invalid or superseded refresh token", body = ApiResponse),
    ),
    tag = "Auth"
)]
pub(crate) async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("refresh_token:handler:invoke");
    req.validate()?;

    let tokens = services::auth::refresh(&state.db, &state.config, &req.refresh_token).await?;
    Ok(ok(tokens))
}
