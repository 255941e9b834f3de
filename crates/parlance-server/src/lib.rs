//! Parlance server library logic.

pub mod api;
pub mod api_analysis;
pub mod api_audio;
pub mod api_conversations;
pub mod api_users;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use parlance_agent::{ChatClient, TurnOrchestrator};
use parlance_db::DbPool;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Per-request turn orchestrator (STT, chat, TTS, store, media).
    pub orchestrator: Arc<TurnOrchestrator>,
    /// Chat client used directly by the analysis endpoints.
    pub chat: ChatClient,
    /// Directory holding audio blobs, served under `/media`.
    pub media_dir: String,
}

/// Maximum request body size for JSON routes (2 MiB).
const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Maximum request body size for audio uploads (25 MiB).
const MAX_AUDIO_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    // Audio intake needs a larger body limit than the JSON routes.
    let audio_routes = Router::new()
        .route("/api/process-audio", post(api_audio::process_audio_handler))
        .layer(DefaultBodyLimit::max(MAX_AUDIO_BODY_BYTES));

    let router = Router::new()
        .route("/health", get(health))
        .route(
            "/api/end-conversation",
            post(api_audio::end_conversation_handler),
        )
        .route("/api/register", post(api_users::register_handler))
        .route("/api/login", post(api_users::login_handler))
        .route(
            "/api/delete-user/{userId}",
            delete(api_users::delete_user_handler),
        )
        .route(
            "/api/update-user/{userId}",
            put(api_users::update_user_handler),
        )
        .route("/api/get-user/{userId}", get(api_users::get_user_handler))
        .route("/api/get-user-id", get(api_users::get_user_id_handler))
        .route("/api/get-all-users", get(api_users::get_all_users_handler))
        .route(
            "/api/toggle-admin-status",
            put(api_users::toggle_admin_handler),
        )
        .route("/api/get-guest-id", get(api_users::get_guest_id_handler))
        .route(
            "/api/get-user-conversations/{userId}",
            get(api_conversations::get_user_conversations_handler),
        )
        .route(
            "/api/get-user-conversations",
            get(api_conversations::get_guest_conversations_handler),
        )
        .route(
            "/api/get-all-conversations",
            get(api_conversations::get_all_conversations_handler),
        )
        .route(
            "/api/get-conversations",
            post(api_conversations::get_conversations_by_range_handler),
        )
        .route(
            "/api/get-audio-files",
            get(api_audio::get_audio_files_handler),
        )
        .route("/api/analysis", get(api_analysis::analysis_handler))
        .route(
            "/api/analysis-by-id/{userId}",
            get(api_analysis::analysis_by_id_handler),
        )
        .route(
            "/api/analysis-by-id-and-range/{userId}",
            get(api_analysis::analysis_by_id_and_range_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .merge(audio_routes);

    // Serve stored audio blobs under /media/*. The directory is created on
    // first write, so don't require it at startup.
    let media_dir = state.media_dir.clone();
    if std::path::Path::new(&media_dir).exists() {
        tracing::info!(path = %media_dir, "serving audio blobs at /media");
    } else {
        tracing::info!(path = %media_dir, "media directory not found yet (created on first upload)");
    }
    let router = router.nest_service("/media", ServeDir::new(&media_dir));

    router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
