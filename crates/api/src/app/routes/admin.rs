use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use vendora_auth::{Role, UserUpdate};
use vendora_core::UserId;

use crate::app::errors::{store_error, ApiError};
use crate::app::extract::ApiJson;
use crate::app::{dto, AppState};
use crate::middleware::{require_role, ADMIN_ONLY};

const NOT_FOUND: &str = "User not found";
const CONFLICT: &str = "Username or email already exists";

/// Admin area: user management plus system stats, every route admin-only.
pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/stats", get(system_stats))
        .route_layer(axum::middleware::from_fn(|req, next| {
            require_role(ADMIN_ONLY, req, next)
        }))
}

pub async fn list_users(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<dto::UserResponse>>, ApiError> {
    let users = state
        .users
        .list()
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok(Json(users.iter().map(dto::UserResponse::from).collect()))
}

pub async fn get_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<dto::UserResponse>, ApiError> {
    let user = state
        .users
        .find_by_id(UserId::new(id))
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    Ok(Json(dto::UserResponse::from(&user)))
}

pub async fn update_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<UserUpdate>,
) -> Result<Json<dto::UserResponse>, ApiError> {
    body.validate()?;
    let user = state
        .users
        .update(UserId::new(id), body)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok(Json(dto::UserResponse::from(&user)))
}

pub async fn delete_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state
        .users
        .delete(UserId::new(id))
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

/// System-wide entity counts, aggregated from raw list data.
pub async fn system_stats(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let users = state
        .users
        .list()
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    let supplier_count = state
        .suppliers
        .list()
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?
        .len();
    let product_count = state
        .products
        .list()
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?
        .len();
    let contact_count = state
        .contacts
        .list(None)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?
        .len();
    let offers = state
        .offers
        .list(Default::default(), Default::default(), Utc::now().date_naive())
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;

    let total = users.len();
    let active = users.iter().filter(|u| u.is_active).count();
    let admins = users.iter().filter(|u| u.role == Role::Admin).count();
    let managers = users.iter().filter(|u| u.role == Role::Manager).count();

    let today = Utc::now().date_naive();
    let offer_total = offers.len();
    // An offer ending today counts as expired here; the reports use an
    // inclusive bound.
    let offer_active = offers.iter().filter(|o| o.valid_to > today).count();

    Ok(Json(json!({
        "users": {
            "total": total,
            "active": active,
            "admins": admins,
            "managers": managers,
            "regularUsers": total - admins - managers,
        },
        "suppliers": supplier_count,
        "products": product_count,
        "contacts": contact_count,
        "offers": {
            "total": offer_total,
            "active": offer_active,
            "expired": offer_total - offer_active,
        },
    })))
}
