// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    store::{StoreError, Storage},
};

/// Lists all users in the system, newest first.
/// Admin only.
pub async fn list_users(State(storage): State<Storage>) -> Result<impl IntoResponse, AppError> {
    let users = storage.users.list().await.map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(users))
}

/// Deletes a user. Their enrollments are left in place.
/// Admin only.
pub async fn delete_user(
    State(storage): State<Storage>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    storage.users.delete(id).await.map_err(|e| match e {
        StoreError::NotFound => AppError::NotFound("User not found".to_string()),
        other => AppError::from(other),
    })?;

    tracing::info!(user_id = id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
