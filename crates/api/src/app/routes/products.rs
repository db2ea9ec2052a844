use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};

use vendora_core::ProductId;
use vendora_products::{NewProduct, ProductUpdate};

use crate::app::errors::{store_error, ApiError};
use crate::app::extract::ApiJson;
use crate::app::{dto, AppState};
use crate::middleware::{require_role, ADMIN_ONLY, MANAGE};

const NOT_FOUND: &str = "Product not found";
const CONFLICT: &str = "Product name already exists";

pub fn router() -> Router {
    let read = Router::new()
        .route("/", get(list_products))
        .route("/:id", get(get_product));
    let manage = Router::new()
        .route("/", post(create_product))
        .route("/:id", put(update_product))
        .route_layer(axum::middleware::from_fn(|req, next| {
            require_role(MANAGE, req, next)
        }));
    let admin = Router::new()
        .route("/:id", delete(delete_product))
        .route_layer(axum::middleware::from_fn(|req, next| {
            require_role(ADMIN_ONLY, req, next)
        }));
    read.merge(manage).merge(admin)
}

pub async fn list_products(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<dto::ProductResponse>>, ApiError> {
    let products = state
        .products
        .list()
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok(Json(products.iter().map(dto::ProductResponse::from).collect()))
}

pub async fn get_product(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<dto::ProductResponse>, ApiError> {
    let product = state
        .products
        .find_by_id(ProductId::new(id))
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    Ok(Json(dto::ProductResponse::from(&product)))
}

pub async fn create_product(
    Extension(state): Extension<Arc<AppState>>,
    ApiJson(body): ApiJson<NewProduct>,
) -> Result<(StatusCode, Json<dto::ProductResponse>), ApiError> {
    body.validate()?;
    let product = state
        .products
        .create(body)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok((StatusCode::CREATED, Json(dto::ProductResponse::from(&product))))
}

pub async fn update_product(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<ProductUpdate>,
) -> Result<Json<dto::ProductResponse>, ApiError> {
    body.validate()?;
    let product = state
        .products
        .update(ProductId::new(id), body)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok(Json(dto::ProductResponse::from(&product)))
}

pub async fn delete_product(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .products
        .delete(ProductId::new(id))
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok(StatusCode::NO_CONTENT)
}
