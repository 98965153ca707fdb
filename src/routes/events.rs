use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::event::{
    EventCreateRequest, EventFilterQuery, EventResponse, EventUpdateRequest,
};
use crate::models::PageQuery;
use crate::response::{created, ok, ApiResponse};
use crate::services;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_event).get(list_events))
        .route(
            "/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
}

fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::invalid_field("id", "Invalid event ID format"))
}

#[utoipa::path(
    post,
    path = "/v1/events",
    request_body = EventCreateRequest,
    responses(
        (status = 201, description = "Event created", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 401, description = "Missing or invalid token", body = ApiResponse),
    ),
    security(("bearer" = [])),
    tag = "Events"
)]
pub(crate) async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<EventCreateRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("create_event:handler:invoke");
    req.validate_payload()?;

    let event = services::events::create(&state.db, auth.user.id, &req).await?;
    Ok(created(EventResponse::from(event)))
}

#[utoipa::path(
    get,
    path = "/v1/events",
    params(PageQuery, EventFilterQuery),
    responses(
        (status = 200, description = "Caller's events, date ascending", body = ApiResponse),
        (status = 401, description = "Missing or invalid token", body = ApiResponse),
    ),
    security(("bearer" = [])),
    tag = "Events"
)]
pub(crate) async fn list_events(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageQuery>,
    Query(filter): Query<EventFilterQuery>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("list_events:handler:invoke");
    let (events, total_count) =
        services::events::list(&state.db, auth.user.id, &filter, &page).await?;
    let events: Vec<EventResponse> = events.into_iter().map(EventResponse::from).collect();
    Ok(ok(json!({
        "events": events,
        "totalCount": total_count,
    })))
}

#[utoipa::path(
    get,
    path = "/v1/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "The event", body = ApiResponse),
        (status = 404, description = "No such event for this caller", body = ApiResponse),
    ),
    security(("bearer" = [])),
    tag = "Events"
)]
pub(crate) async fn get_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("get_event:handler:invoke");
    let id = parse_id(&id)?;
    let event = services::events::get(&state.db, auth.user.id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;
    Ok(ok(EventResponse::from(event)))
}

#[utoipa::path(
    put,
    path = "/v1/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    request_body = EventUpdateRequest,
    responses(
        (status = 200, description = "Updated event", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 404, description = "No such event for this caller", body = ApiResponse),
    ),
    security(("bearer" = [])),
    tag = "Events"
)]
pub(crate) async fn update_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<EventUpdateRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("update_event:handler:invoke");
    let id = parse_id(&id)?;
    req.validate_payload()?;

    let event = services::events::update(&state.db, auth.user.id, id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;
    Ok(ok(EventResponse::from(event)))
}

#[utoipa::path(
    delete,
    path = "/v1/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event deleted", body = ApiResponse),
        (status = 404, description = "No such event for this caller", body = ApiResponse),
    ),
    security(("bearer" = [])),
    tag = "Events"
)]
pub(crate) async fn delete_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    tracing::info!("delete_event:handler:invoke");
    let id = parse_id(&id)?;
    if !services::events::delete(&state.db, auth.user.id, id).await? {
        return Err(AppError::not_found("Event not found"));
    }
    Ok(ok(json!({ "message": "Event deleted successfully" })))
}
