use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use vendora_auth::{hash_password, verify_password, NewUser};
use vendora_infra::NewUserRecord;

use crate::app::errors::{store_error, ApiError};
use crate::app::extract::ApiJson;
use crate::app::{dto, AppState};
use crate::context::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    ApiJson(body): ApiJson<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
    body.validate()?;

    let password_hash =
        hash_password(&body.password).map_err(|e| ApiError::Store(e.to_string()))?;
    let record = NewUserRecord {
        username: body.username.trim().to_string(),
        email: body.email.trim().to_string(),
        password_hash,
        role: body.role_or_default(),
    };

    let user = state
        .users
        .create(record)
        .await
        .map_err(|e| store_error(e, "User not found", "Username or email already exists"))?;
    let token = state
        .tokens
        .issue(user.id, user.role)
        .map_err(|_| ApiError::Store("failed to sign session token".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user": dto::AuthUser::from(&user),
            "token": token,
        })),
    ))
}

pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .find_by_username(&body.username)
        .await
        .map_err(|e| store_error(e, "User not found", "Username or email already exists"))?
        .ok_or(ApiError::unauthenticated("Invalid credentials"))?;

    if !user.is_active {
        return Err(ApiError::unauthenticated("Account is deactivated"));
    }
    if !verify_password(&body.password, &user.password_hash) {
        return Err(ApiError::unauthenticated("Invalid credentials"));
    }

    let token = state
        .tokens
        .issue(user.id, user.role)
        .map_err(|_| ApiError::Store("failed to sign session token".to_string()))?;

    Ok(Json(json!({
        "message": "Login successful",
        "user": dto::AuthUser::from(&user),
        "token": token,
    })))
}

/// Current caller, resolved from the verified token.
pub async fn me(
    Extension(state): Extension<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<dto::UserResponse>, ApiError> {
    let user = state
        .users
        .find_by_id(current.id)
        .await
        .map_err(|e| store_error(e, "User not found", "Username or email already exists"))?
        .ok_or(ApiError::NotFound("User not found"))?;
    Ok(Json(dto::UserResponse::from(&user)))
}
