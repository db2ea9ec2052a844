//! Referential validator: parent-exists checks shared by the dependent
//! write handlers. Runs before the store call; a miss fails the whole
//! operation with 400 and nothing is persisted.

use vendora_core::{ProductId, SupplierId};
use vendora_products::Product;
use vendora_suppliers::Supplier;

use crate::app::errors::{store_error, ApiError};
use crate::app::AppState;

pub async fn require_supplier(state: &AppState, id: SupplierId) -> Result<Supplier, ApiError> {
    state
        .suppliers
        .find_by_id(id)
        .await
        .map_err(|e| store_error(e, "Supplier not found", "Supplier email already in use"))?
        .ok_or_else(|| ApiError::invalid_reference("Supplier", id.as_i64(), "supplierId"))
}

pub async fn require_product(state: &AppState, id: ProductId) -> Result<Product, ApiError> {
    state
        .products
        .find_by_id(id)
        .await
        .map_err(|e| store_error(e, "Product not found", "Product name already exists"))?
        .ok_or_else(|| ApiError::invalid_reference("Product", id.as_i64(), "productId"))
}
