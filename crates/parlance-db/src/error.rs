use thiserror::Error;

/// Errors produced by the conversation store.
///
/// The HTTP layer maps these onto status codes: `Validation` → 400,
/// `Unauthorized` → 401, `PermissionDenied` → 403, `NotFound` → 404,
/// `Conflict` → 409, `Database` → 500.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not found: {0}")]
    NotFound(String),
}
