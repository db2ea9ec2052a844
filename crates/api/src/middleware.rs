//! Authentication and authorization gates.
//!
//! The authentication gate wraps every route except the landing page and
//! `/api/auth/{register,login}`. The authorization gate is applied per
//! route with `route_layer`, so a method can carry a different allowed
//! set than its siblings on the same path.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use vendora_auth::{authorize, Role, TokenService};

use crate::app::errors::ApiError;
use crate::context::CurrentUser;

/// Roles allowed to create and update resources.
pub const MANAGE: &[Role] = &[Role::Admin, Role::Manager];
/// Roles allowed to delete resources and reach `/api/admin`.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
}

/// Authentication gate. On success the verified caller is inserted into
/// request extensions; every failure ends the request here.
pub async fn authenticate(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(token) => token,
        Err(err) => return err.into_response(),
    };

    let claims = match state.tokens.verify_at(token, Utc::now()) {
        Ok(claims) => claims,
        Err(_) => return ApiError::forbidden("Invalid or expired token").into_response(),
    };

    req.extensions_mut().insert(CurrentUser {
        id: claims.sub,
        role: claims.role,
    });

    next.run(req).await
}

/// Authorization gate, composed after `authenticate` on write routes.
pub async fn require_role(allowed: &'static [Role], req: Request, next: Next) -> Response {
    let Some(current) = req.extensions().get::<CurrentUser>() else {
        return ApiError::forbidden("Role information missing").into_response();
    };
    if authorize(current.role, allowed).is_err() {
        return ApiError::forbidden("Insufficient permissions").into_response();
    }
    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(ApiError::unauthenticated("Authorization header missing"))?;

    let header = header
        .to_str()
        .map_err(|_| ApiError::unauthenticated("Token missing"))?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .unwrap_or_default();
    if token.is_empty() {
        return Err(ApiError::unauthenticated("Token missing"));
    }

    Ok(token)
}
