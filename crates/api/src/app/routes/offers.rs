use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use vendora_core::{OfferId, ProductId, SupplierId};
use vendora_offers::{NewOffer, Offer, OfferFilter, OfferSort, OfferUpdate};
use vendora_products::Product;
use vendora_suppliers::Supplier;

use crate::app::errors::{store_error, ApiError};
use crate::app::extract::ApiJson;
use crate::app::routes::common::{require_product, require_supplier};
use crate::app::{dto, AppState};
use crate::middleware::{require_role, ADMIN_ONLY, MANAGE};

const NOT_FOUND: &str = "Offer not found";
const CONFLICT: &str = "Offer already exists";

pub fn router() -> Router {
    let read = Router::new()
        .route("/", get(list_offers))
        .route("/:id", get(get_offer));
    let manage = Router::new()
        .route("/", post(create_offer))
        .route("/:id", put(update_offer))
        .route_layer(axum::middleware::from_fn(|req, next| {
            require_role(MANAGE, req, next)
        }));
    let admin = Router::new()
        .route("/:id", delete(delete_offer))
        .route_layer(axum::middleware::from_fn(|req, next| {
            require_role(ADMIN_ONLY, req, next)
        }));
    read.merge(manage).merge(admin)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferListParams {
    pub supplier_id: Option<i64>,
    pub product_id: Option<i64>,
    pub active: Option<bool>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl OfferListParams {
    fn filter(&self) -> OfferFilter {
        OfferFilter {
            supplier_id: self.supplier_id.map(SupplierId::new),
            product_id: self.product_id.map(ProductId::new),
            active: self.active,
        }
    }

    // Unknown sort keys and orders fall back to the defaults
    // (createdAt descending).
    fn sort(&self) -> OfferSort {
        OfferSort {
            field: self
                .sort_by
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            order: self
                .order
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        }
    }
}

pub(crate) async fn parent_maps(
    state: &AppState,
) -> Result<(HashMap<SupplierId, Supplier>, HashMap<ProductId, Product>), ApiError> {
    let suppliers = state
        .suppliers
        .list()
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let products = state
        .products
        .list()
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    Ok((suppliers, products))
}

fn offer_response(
    offer: &Offer,
    suppliers: &HashMap<SupplierId, Supplier>,
    products: &HashMap<ProductId, Product>,
) -> dto::OfferResponse {
    dto::OfferResponse::new(
        offer,
        suppliers.get(&offer.supplier_id),
        products.get(&offer.product_id),
    )
}

pub async fn list_offers(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<OfferListParams>,
) -> Result<Json<Vec<dto::OfferResponse>>, ApiError> {
    let today = Utc::now().date_naive();
    let offers = state
        .offers
        .list(params.filter(), params.sort(), today)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    let (suppliers, products) = parent_maps(&state).await?;
    Ok(Json(
        offers
            .iter()
            .map(|o| offer_response(o, &suppliers, &products))
            .collect(),
    ))
}

pub async fn get_offer(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<dto::OfferResponse>, ApiError> {
    let offer = state
        .offers
        .find_by_id(OfferId::new(id))
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    let supplier = state
        .suppliers
        .find_by_id(offer.supplier_id)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    let product = state
        .products
        .find_by_id(offer.product_id)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok(Json(dto::OfferResponse::new(
        &offer,
        supplier.as_ref(),
        product.as_ref(),
    )))
}

pub async fn create_offer(
    Extension(state): Extension<Arc<AppState>>,
    ApiJson(body): ApiJson<NewOffer>,
) -> Result<(StatusCode, Json<dto::OfferResponse>), ApiError> {
    body.validate()?;
    let supplier = require_supplier(&state, body.supplier_id).await?;
    let product = require_product(&state, body.product_id).await?;
    let offer = state
        .offers
        .create(body)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok((
        StatusCode::CREATED,
        Json(dto::OfferResponse::new(&offer, Some(&supplier), Some(&product))),
    ))
}

pub async fn update_offer(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<OfferUpdate>,
) -> Result<Json<dto::OfferResponse>, ApiError> {
    body.validate()?;

    let current = state
        .offers
        .find_by_id(OfferId::new(id))
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;

    // When only one window bound changes, check it against the bound that
    // stays in place.
    let valid_from = body.valid_from.unwrap_or(current.valid_from);
    let valid_to = body.valid_to.unwrap_or(current.valid_to);
    if valid_to < valid_from {
        return Err(ApiError::Validation(vec![
            "validTo must not be before validFrom".to_string(),
        ]));
    }

    if let Some(supplier_id) = body.supplier_id {
        require_supplier(&state, supplier_id).await?;
    }
    if let Some(product_id) = body.product_id {
        require_product(&state, product_id).await?;
    }

    let offer = state
        .offers
        .update(OfferId::new(id), body)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    let supplier = state
        .suppliers
        .find_by_id(offer.supplier_id)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    let product = state
        .products
        .find_by_id(offer.product_id)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok(Json(dto::OfferResponse::new(
        &offer,
        supplier.as_ref(),
        product.as_ref(),
    )))
}

pub async fn delete_offer(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .offers
        .delete(OfferId::new(id))
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok(StatusCode::NO_CONTENT)
}
