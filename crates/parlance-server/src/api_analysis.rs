//! Conversation analysis API handlers.

use crate::{api::run_blocking, api::ApiError, AppState};
use axum::extract::{Extension, Json, Path, Query};
use parlance_agent::{analyze, combine_conversations, TextAnalysis};
use parlance_types::Conversation;
use serde::Deserialize;
use std::sync::Arc;

/// Query parameters for `GET /api/analysis-by-id-and-range/{userId}`.
#[derive(Debug, Deserialize)]
pub struct AnalysisRangeQuery {
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
}

/// Handler for `GET /api/analysis`: critique of everything ever said.
pub async fn analysis_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<TextAnalysis>, ApiError> {
    let conversations = load_or_empty(
        run_blocking(state.pool.clone(), parlance_db::get_all_conversations).await,
    )?;
    respond(&state, conversations).await
}

/// Handler for `GET /api/analysis-by-id/{userId}`.
pub async fn analysis_by_id_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<TextAnalysis>, ApiError> {
    let conversations = load_or_empty(
        run_blocking(state.pool.clone(), move |conn| {
            parlance_db::get_user_conversations(conn, &user_id)
        })
        .await,
    )?;
    respond(&state, conversations).await
}

/// Handler for `GET /api/analysis-by-id-and-range/{userId}?startDate=&endDate=`.
pub async fn analysis_by_id_and_range_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<AnalysisRangeQuery>,
) -> Result<Json<TextAnalysis>, ApiError> {
    let conversations = load_or_empty(
        run_blocking(state.pool.clone(), move |conn| {
            parlance_db::get_conversations_by_date_range(
                conn,
                Some(&user_id),
                &query.start_date,
                &query.end_date,
            )
        })
        .await,
    )?;
    respond(&state, conversations).await
}

/// A store with nothing to analyze is not an error here: the aggregator
/// produces its "No data available." sentinel instead.
fn load_or_empty(
    result: Result<Vec<Conversation>, ApiError>,
) -> Result<Vec<Conversation>, ApiError> {
    match result {
        Ok(list) => Ok(list),
        Err(ApiError::NotFound(_)) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

async fn respond(
    state: &AppState,
    conversations: Vec<Conversation>,
) -> Result<Json<TextAnalysis>, ApiError> {
    let corpus = combine_conversations(&conversations);
    let analysis = analyze(&state.chat, &corpus).await?;
    Ok(Json(analysis))
}
