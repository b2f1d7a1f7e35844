//! Session CRUD HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/sessions      - Create a session for the caller
//! - GET    /api/v1/sessions      - List the caller's sessions (summaries)
//! - GET    /api/v1/sessions/{id} - Get a single session with full history
//! - DELETE /api/v1/sessions/{id} - Delete a session
//!
//! Every handler is scoped to the authenticated owner; a session that
//! belongs to someone else is a 404, never a 403.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::handlers::parse_uuid;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for session listing.
#[derive(Debug, Deserialize)]
pub struct SessionListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Request body for session creation.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub appliance_context: Option<String>,
}

/// POST /api/v1/sessions - Create a new session.
pub async fn create_session(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(body): Json<CreateSessionRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = state
        .session_service
        .create_session(&auth.owner, body.appliance_context)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let session_json =
        serde_json::to_value(&session).map_err(|e| AppError::Internal(e.to_string()))?;
    let resp = ApiResponse::success(session_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{}", session.id))
        .with_link(
            "messages",
            &format!("/api/v1/sessions/{}/messages", session.id),
        );

    Ok(Json(resp))
}

/// GET /api/v1/sessions - List the caller's sessions as summaries.
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: Authenticated,
    Query(query): Query<SessionListQuery>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let summaries = state
        .session_service
        .list_sessions(&auth.owner, Some(query.limit), Some(query.offset))
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let summaries_json = summaries
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let resp = ApiResponse::success(summaries_json, request_id, elapsed)
        .with_link("self", "/api/v1/sessions");

    Ok(Json(resp))
}

/// GET /api/v1/sessions/{id} - Get a session with its full history.
pub async fn get_session(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let session = state.session_service.get_session(&sid, &auth.owner).await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let session_json =
        serde_json::to_value(&session).map_err(|e| AppError::Internal(e.to_string()))?;
    let resp = ApiResponse::success(session_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{}", session.id))
        .with_link(
            "messages",
            &format!("/api/v1/sessions/{}/messages", session.id),
        );

    Ok(Json(resp))
}

/// DELETE /api/v1/sessions/{id} - Delete a session.
pub async fn delete_session(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    state
        .session_service
        .delete_session(&sid, &auth.owner)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(serde_json::json!({"deleted": true}), request_id, elapsed);

    Ok(Json(resp))
}
