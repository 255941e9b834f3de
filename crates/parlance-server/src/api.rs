//! Shared API error taxonomy and handler plumbing.

use axum::{
    extract::Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use parlance_agent::AgentError;
use parlance_db::StoreError;
use parlance_voice::VoiceError;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("upstream timeout: {0}")]
    Timeout(String),
    #[error("internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => ApiError::BadRequest(msg),
            StoreError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            StoreError::PermissionDenied(msg) => ApiError::Forbidden(msg),
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Database(e) => {
                tracing::error!(error = %e, "database failure");
                ApiError::Internal("A database error occurred.".to_string())
            }
        }
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Store(e) => e.into(),
            AgentError::Voice(VoiceError::Timeout { service }) => {
                tracing::error!(service, "speech collaborator timed out");
                ApiError::Timeout(format!("{service} request timed out"))
            }
            AgentError::Timeout => {
                tracing::error!("chat collaborator timed out");
                ApiError::Timeout("chat completion timed out".to_string())
            }
            AgentError::Voice(e) => {
                tracing::error!(error = %e, "speech collaborator failure");
                ApiError::Internal("A speech service error occurred.".to_string())
            }
            AgentError::Chat(e) => {
                tracing::error!(error = %e, "chat collaborator failure");
                ApiError::Internal("A language model error occurred.".to_string())
            }
            AgentError::Pool(e) | AgentError::Join(e) => {
                tracing::error!(error = %e, "internal task failure");
                ApiError::Internal("An internal error occurred.".to_string())
            }
        }
    }
}

/// Runs store work on the blocking pool with a pooled connection, mapping
/// pool and join failures to opaque 500s.
pub(crate) async fn run_blocking<T, F>(pool: parlance_db::DbPool, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Connection) -> Result<T, StoreError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(|e| {
            tracing::error!(error = %e, "failed to get pooled connection");
            ApiError::Internal("An internal error occurred.".to_string())
        })?;
        f(&conn).map_err(ApiError::from)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "blocking task panicked");
        ApiError::Internal("An internal error occurred.".to_string())
    })?;
    result
}
