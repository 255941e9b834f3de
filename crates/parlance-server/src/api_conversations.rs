//! Conversation query API handlers.

use crate::{api::run_blocking, api::ApiError, AppState};
use axum::extract::{Extension, Json, Path};
use parlance_types::Conversation;
use serde::Deserialize;
use std::sync::Arc;

/// Request body for `POST /api/get-conversations`.
#[derive(Debug, Deserialize)]
pub struct DateRangeRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
}

/// Handler for `GET /api/get-user-conversations/{userId}`.
pub async fn get_user_conversations_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    let conversations = run_blocking(state.pool.clone(), move |conn| {
        parlance_db::get_user_conversations(conn, &user_id)
    })
    .await?;
    Ok(Json(conversations))
}

/// Handler for `GET /api/get-user-conversations` (no user id).
///
/// Falls back to the session guest identity, matching the anonymous
/// snippet path.
pub async fn get_guest_conversations_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    let guest_id = state.orchestrator.guest_id().await?;
    let conversations = run_blocking(state.pool.clone(), move |conn| {
        parlance_db::get_user_conversations(conn, &guest_id)
    })
    .await?;
    Ok(Json(conversations))
}

/// Handler for `GET /api/get-all-conversations`.
pub async fn get_all_conversations_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    let conversations =
        run_blocking(state.pool.clone(), parlance_db::get_all_conversations).await?;
    Ok(Json(conversations))
}

/// Handler for `POST /api/get-conversations`.
///
/// Returns conversations started within `[startDate, endDate]` (inclusive;
/// bare dates cover the whole day), scoped to a user when `userId` is
/// given.
pub async fn get_conversations_by_range_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<DateRangeRequest>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    let conversations = run_blocking(state.pool.clone(), move |conn| {
        parlance_db::get_conversations_by_date_range(
            conn,
            payload.user_id.as_deref(),
            &payload.start_date,
            &payload.end_date,
        )
    })
    .await?;
    Ok(Json(conversations))
}
