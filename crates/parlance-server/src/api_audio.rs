//! Audio intake and playback API handlers.

use crate::{api::run_blocking, api::ApiError, AppState};
use axum::{
    extract::{Extension, Json, Multipart, Query},
    http::header,
    response::{IntoResponse, Response},
};
use parlance_types::AudioRefs;
use serde::Deserialize;
use std::sync::Arc;

/// Request body for `POST /api/end-conversation`.
#[derive(Debug, Default, Deserialize)]
pub struct EndConversationRequest {
    #[serde(default)]
    pub participants: Vec<String>,
}

/// Query parameters for `GET /api/get-audio-files`.
#[derive(Debug, Deserialize)]
pub struct AudioFilesQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "conversationId")]
    pub conversation_id: Option<String>,
}

/// Handler for `POST /api/process-audio`.
///
/// Multipart fields: `audio` (the recorded snippet) and an optional
/// `participants` field holding a JSON-encoded array of ids/emails. The
/// response body is the synthesized answer as `audio/mpeg`, zero-length
/// whenever no answer was produced.
pub async fn process_audio_handler(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut audio: Option<Vec<u8>> = None;
    let mut participants: Vec<String> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("multipart error: {e}")))?
    {
        match field.name() {
            Some("audio") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("failed to read audio: {e}")))?;
                audio = Some(data.to_vec());
            }
            Some("participants") => {
                let text = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("failed to read participants: {e}"))
                })?;
                if !text.trim().is_empty() {
                    participants = serde_json::from_str(&text).map_err(|e| {
                        ApiError::BadRequest(format!("participants must be a JSON array: {e}"))
                    })?;
                }
            }
            other => {
                tracing::debug!(field = ?other, "ignoring unknown multipart field");
            }
        }
    }

    let audio = audio.ok_or_else(|| ApiError::BadRequest("no audio field provided".to_string()))?;
    if audio.is_empty() {
        tracing::debug!("received empty audio snippet");
        return Ok(mp3_response(Vec::new()));
    }

    let answer = state.orchestrator.handle_audio(audio, participants).await?;
    Ok(mp3_response(answer))
}

/// Handler for `POST /api/end-conversation`.
pub async fn end_conversation_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<EndConversationRequest>,
) -> Result<Response, ApiError> {
    let ended = state
        .orchestrator
        .end_conversation(payload.participants)
        .await?;

    let message = match ended {
        Some(_) => "Conversation ended.",
        None => "No open conversation to end.",
    };
    Ok(message.into_response())
}

/// Handler for `GET /api/get-audio-files?userId=&conversationId=`.
///
/// Four selection modes: no filter, user only, conversation only, or both.
pub async fn get_audio_files_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<AudioFilesQuery>,
) -> Result<Json<Vec<AudioRefs>>, ApiError> {
    let refs = run_blocking(state.pool.clone(), move |conn| {
        parlance_db::get_audio_references(
            conn,
            query.user_id.as_deref(),
            query.conversation_id.as_deref(),
        )
    })
    .await?;
    Ok(Json(refs))
}

fn mp3_response(audio: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response()
}
