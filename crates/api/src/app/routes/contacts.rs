use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use vendora_core::{ContactId, SupplierId};
use vendora_suppliers::{ContactUpdate, NewContact, Supplier};

use crate::app::errors::{store_error, ApiError};
use crate::app::extract::ApiJson;
use crate::app::routes::common::require_supplier;
use crate::app::{dto, AppState};
use crate::middleware::{require_role, ADMIN_ONLY, MANAGE};

const NOT_FOUND: &str = "Contact not found";
const CONFLICT: &str = "Contact email already in use";

pub fn router() -> Router {
    let read = Router::new()
        .route("/", get(list_contacts))
        .route("/:id", get(get_contact));
    let manage = Router::new()
        .route("/", post(create_contact))
        .route("/:id", put(update_contact))
        .route_layer(axum::middleware::from_fn(|req, next| {
            require_role(MANAGE, req, next)
        }));
    let admin = Router::new()
        .route("/:id", delete(delete_contact))
        .route_layer(axum::middleware::from_fn(|req, next| {
            require_role(ADMIN_ONLY, req, next)
        }));
    read.merge(manage).merge(admin)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactListParams {
    pub supplier_id: Option<i64>,
}

pub async fn list_contacts(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<ContactListParams>,
) -> Result<Json<Vec<dto::ContactResponse>>, ApiError> {
    let contacts = state
        .contacts
        .list(params.supplier_id.map(SupplierId::new))
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;

    let suppliers: HashMap<SupplierId, Supplier> = state
        .suppliers
        .list()
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    Ok(Json(
        contacts
            .iter()
            .map(|c| dto::ContactResponse::new(c, suppliers.get(&c.supplier_id)))
            .collect(),
    ))
}

pub async fn get_contact(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<dto::ContactResponse>, ApiError> {
    let contact = state
        .contacts
        .find_by_id(ContactId::new(id))
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    let supplier = state
        .suppliers
        .find_by_id(contact.supplier_id)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok(Json(dto::ContactResponse::new(&contact, supplier.as_ref())))
}

pub async fn create_contact(
    Extension(state): Extension<Arc<AppState>>,
    ApiJson(body): ApiJson<NewContact>,
) -> Result<(StatusCode, Json<dto::ContactResponse>), ApiError> {
    body.validate()?;
    let supplier = require_supplier(&state, body.supplier_id).await?;
    let contact = state
        .contacts
        .create(body)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok((
        StatusCode::CREATED,
        Json(dto::ContactResponse::new(&contact, Some(&supplier))),
    ))
}

pub async fn update_contact(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<ContactUpdate>,
) -> Result<Json<dto::ContactResponse>, ApiError> {
    body.validate()?;
    if let Some(supplier_id) = body.supplier_id {
        require_supplier(&state, supplier_id).await?;
    }
    let contact = state
        .contacts
        .update(ContactId::new(id), body)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    let supplier = state
        .suppliers
        .find_by_id(contact.supplier_id)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok(Json(dto::ContactResponse::new(&contact, supplier.as_ref())))
}

pub async fn delete_contact(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .contacts
        .delete(ContactId::new(id))
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    Ok(StatusCode::NO_CONTENT)
}
