// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{CreateUserRequest, LoginRequest, NewUser, Role},
    store::{StoreError, Storage},
    utils::{
        hash::{hash_password, verify_password},
        jwt::{Claims, sign_jwt},
    },
};

/// Registers a new learner or instructor.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(storage): State<Storage>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let role = payload.role.unwrap_or(Role::Learner);
    if role == Role::Admin {
        return Err(AppError::BadRequest(
            "Admin accounts cannot be self-registered".to_string(),
        ));
    }

    let new_user = NewUser {
        name: payload.name,
        email: payload.email.trim().to_string(),
        password: hash_password(&payload.password)?,
        role,
        bio: payload.bio,
    };
    let email = new_user.email.clone();

    let user = storage.users.create(new_user).await.map_err(|e| match e {
        StoreError::Conflict => AppError::Conflict(format!("Email '{}' is already registered", email)),
        other => {
            tracing::error!("Failed to register user: {:?}", other);
            AppError::from(other)
        }
    })?;

    tracing::info!(user_id = user.id, role = %user.role, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(storage): State<Storage>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = storage
        .users
        .find_by_email(payload.email.trim())
        .await?
        .ok_or(AppError::AuthError("Invalid email or password".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError("Invalid email or password".to_string()));
    }

    let token = sign_jwt(&user, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "user": user
    })))
}

/// Returns the user behind the session token.
pub async fn me(
    State(storage): State<Storage>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let session = claims.session()?;
    let user = storage
        .users
        .get(session.user_id)
        .await?
        .ok_or(AppError::AuthError("User no longer exists".to_string()))?;

    Ok(Json(user))
}
