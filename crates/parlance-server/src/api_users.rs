//! User account API handlers.

use crate::{api::run_blocking, api::ApiError, AppState};
use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
};
use parlance_db::{UpdateUserParams, UserProfile};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Request body for registration and login.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response body for successful registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Query parameters for `GET /api/get-user-id`.
#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub email: String,
}

/// Request body for `PUT /api/toggle-admin-status`.
#[derive(Debug, Deserialize)]
pub struct ToggleAdminRequest {
    pub email: String,
    #[serde(rename = "requestingUserId")]
    pub requesting_user_id: Option<String>,
}

/// Handler for `POST /api/register`.
pub async fn register_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user_id = run_blocking(state.pool.clone(), move |conn| {
        parlance_db::register_user(conn, &payload.email, &payload.password)
    })
    .await?;

    tracing::info!(user_id = %user_id, "registered user");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully.".to_string(),
            user_id,
        }),
    ))
}

/// Handler for `POST /api/login`.
pub async fn login_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = run_blocking(state.pool.clone(), move |conn| {
        parlance_db::login_user(conn, &payload.email, &payload.password)
    })
    .await?;
    Ok(Json(profile))
}

/// Handler for `DELETE /api/delete-user/{userId}`.
pub async fn delete_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let deleted_id = user_id.clone();
    run_blocking(state.pool.clone(), move |conn| {
        parlance_db::delete_user(conn, &user_id)
    })
    .await?;

    tracing::info!(user_id = %deleted_id, "deleted user");
    Ok(Json(json!({ "message": "User deleted successfully." })))
}

/// Handler for `PUT /api/update-user/{userId}`.
pub async fn update_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(params): Json<UpdateUserParams>,
) -> Result<Json<Value>, ApiError> {
    run_blocking(state.pool.clone(), move |conn| {
        parlance_db::update_user(conn, &user_id, &params)
    })
    .await?;
    Ok(Json(json!({ "message": "User updated successfully." })))
}

/// Handler for `GET /api/get-user/{userId}`.
pub async fn get_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = run_blocking(state.pool.clone(), move |conn| {
        parlance_db::get_user_by_id(conn, &user_id)
    })
    .await?;
    Ok(Json(profile))
}

/// Handler for `GET /api/get-user-id?email=`.
pub async fn get_user_id_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<Value>, ApiError> {
    let user_id = run_blocking(state.pool.clone(), move |conn| {
        parlance_db::get_user_id_by_email(conn, &query.email)
    })
    .await?;
    Ok(Json(json!({ "userId": user_id })))
}

/// Handler for `GET /api/get-all-users`.
pub async fn get_all_users_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let users = run_blocking(state.pool.clone(), parlance_db::get_all_users).await?;
    Ok(Json(users))
}

/// Handler for `PUT /api/toggle-admin-status`.
pub async fn toggle_admin_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<ToggleAdminRequest>,
) -> Result<Json<Value>, ApiError> {
    let (user_id, is_admin) = run_blocking(state.pool.clone(), move |conn| {
        parlance_db::toggle_admin_status_by_email(
            conn,
            payload.requesting_user_id.as_deref(),
            &payload.email,
        )
    })
    .await?;

    tracing::info!(user_id = %user_id, admin = is_admin, "toggled admin status");
    Ok(Json(json!({
        "userId": user_id,
        "Admin": is_admin,
        "message": "Admin status updated.",
    })))
}

/// Handler for `GET /api/get-guest-id`.
///
/// Returns the process-scoped guest identity; repeated calls within one
/// server session return the same id.
pub async fn get_guest_id_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let guest_id = state.orchestrator.guest_id().await?;
    Ok(Json(json!({ "guestId": guest_id })))
}
