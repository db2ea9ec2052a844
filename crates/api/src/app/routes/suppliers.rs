use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};

use vendora_core::SupplierId;
use vendora_suppliers::{NewSupplier, SupplierUpdate};

use crate::app::errors::{store_error, ApiError};
use crate::app::extract::ApiJson;
use crate::app::{dto, AppState};
use crate::middleware::{require_role, ADMIN_ONLY, MANAGE};

const NOT_FOUND: &str = "Supplier not found";
const CONFLICT: &str = "Supplier email already in use";

pub fn router() -> Router {
    let read = Router::new()
        .route("/", get(list_suppliers))
        .route("/:id", get(get_supplier));
    let manage = Router::new()
        .route("/", post(create_supplier))
        .route("/:id", put(update_supplier))
        .route_layer(axum::middleware::from_fn(|req, next| {
            require_role(MANAGE, req, next)
        }));
    let admin = Router::new()
        .route("/:id", delete(delete_supplier))
        .route_layer(axum::middleware::from_fn(|req, next| {
            require_role(ADMIN_ONLY, req, next)
        }));
    read.merge(manage).merge(admin)
}

pub async fn list_suppliers(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<dto::SupplierResponse>>, ApiError> {
    let suppliers = state
        .suppliers
        .list()
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok(Json(suppliers.iter().map(dto::SupplierResponse::from).collect()))
}

pub async fn get_supplier(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<dto::SupplierResponse>, ApiError> {
    let supplier = state
        .suppliers
        .find_by_id(SupplierId::new(id))
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    Ok(Json(dto::SupplierResponse::from(&supplier)))
}

pub async fn create_supplier(
    Extension(state): Extension<Arc<AppState>>,
    ApiJson(body): ApiJson<NewSupplier>,
) -> Result<(StatusCode, Json<dto::SupplierResponse>), ApiError> {
    body.validate()?;
    let supplier = state
        .suppliers
        .create(body)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok((StatusCode::CREATED, Json(dto::SupplierResponse::from(&supplier))))
}

pub async fn update_supplier(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<SupplierUpdate>,
) -> Result<Json<dto::SupplierResponse>, ApiError> {
    body.validate()?;
    let supplier = state
        .suppliers
        .update(SupplierId::new(id), body)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok(Json(dto::SupplierResponse::from(&supplier)))
}

pub async fn delete_supplier(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .suppliers
        .delete(SupplierId::new(id))
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok(StatusCode::NO_CONTENT)
}
