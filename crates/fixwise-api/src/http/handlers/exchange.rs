//! Exchange HTTP handler.
//!
//! POST /api/v1/sessions/{id}/messages - append the user's prompt (and
//! optional inline media) to the session and return the model's reply
//! plus the exact history that was persisted.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use uuid::Uuid;

use fixwise_types::turn::MediaAttachment;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::handlers::parse_uuid;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for an exchange.
#[derive(Debug, Deserialize)]
pub struct ExchangeRequest {
    /// The user's message text. May be empty when media is supplied.
    #[serde(default)]
    pub prompt: String,
    /// Optional inline media attachment.
    #[serde(default)]
    pub media: Option<MediaPayload>,
}

/// Inline media as sent over the wire: mime type plus base64 data.
#[derive(Debug, Deserialize)]
pub struct MediaPayload {
    pub mime_type: String,
    pub data: String,
}

impl MediaPayload {
    fn decode(self) -> Result<MediaAttachment, AppError> {
        let data = BASE64
            .decode(self.data.as_bytes())
            .map_err(|e| AppError::Validation(format!("Invalid base64 media data: {e}")))?;
        Ok(MediaAttachment {
            mime_type: self.mime_type,
            data,
        })
    }
}

/// POST /api/v1/sessions/{id}/messages - Run one exchange.
pub async fn post_message(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(session_id): Path<String>,
    Json(body): Json<ExchangeRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;

    let media = body.media.map(MediaPayload::decode).transpose()?;

    let outcome = state
        .session_service
        .handle_exchange(&sid, &auth.owner, &body.prompt, media)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let outcome_json =
        serde_json::to_value(&outcome).map_err(|e| AppError::Internal(e.to_string()))?;
    let resp = ApiResponse::success(outcome_json, request_id, elapsed)
        .with_link("session", &format!("/api/v1/sessions/{session_id}"));

    Ok(Json(resp))
}
