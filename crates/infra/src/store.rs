//! Per-entity persistence traits.
//!
//! The write pipeline talks to these and nothing else: `find_by_id` backs
//! the referential checks, the mutation methods own uniqueness, cascades,
//! and the atomic last-admin guard.

use async_trait::async_trait;
use chrono::NaiveDate;

use vendora_auth::{Role, User, UserUpdate};
use vendora_core::{ContactId, OfferId, ProductId, SupplierId, UserId};
use vendora_offers::{NewOffer, Offer, OfferFilter, OfferSort, OfferUpdate};
use vendora_products::{NewProduct, Product, ProductUpdate};
use vendora_suppliers::{Contact, ContactUpdate, NewContact, NewSupplier, Supplier, SupplierUpdate};

use crate::error::StoreResult;

/// Credential row ready for insertion: the password is already hashed, the
/// raw secret never crosses this boundary.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn list(&self) -> StoreResult<Vec<User>>;
    async fn create(&self, record: NewUserRecord) -> StoreResult<User>;

    /// Apply a partial update. When the update would deactivate the last
    /// active admin, fails atomically with `StoreError::LastAdmin`.
    async fn update(&self, id: UserId, changes: UserUpdate) -> StoreResult<User>;

    /// Delete a credential. When the target is the last admin, fails
    /// atomically with `StoreError::LastAdmin`.
    async fn delete(&self, id: UserId) -> StoreResult<()>;
}

#[async_trait]
pub trait SupplierStore: Send + Sync {
    async fn find_by_id(&self, id: SupplierId) -> StoreResult<Option<Supplier>>;
    async fn list(&self) -> StoreResult<Vec<Supplier>>;
    async fn create(&self, payload: NewSupplier) -> StoreResult<Supplier>;
    async fn update(&self, id: SupplierId, changes: SupplierUpdate) -> StoreResult<Supplier>;

    /// Cascades to the supplier's contacts and offers.
    async fn delete(&self, id: SupplierId) -> StoreResult<()>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Product>>;
    async fn list(&self) -> StoreResult<Vec<Product>>;
    async fn create(&self, payload: NewProduct) -> StoreResult<Product>;
    async fn update(&self, id: ProductId, changes: ProductUpdate) -> StoreResult<Product>;

    /// Cascades to the product's offers.
    async fn delete(&self, id: ProductId) -> StoreResult<()>;
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn find_by_id(&self, id: ContactId) -> StoreResult<Option<Contact>>;
    async fn list(&self, supplier_id: Option<SupplierId>) -> StoreResult<Vec<Contact>>;
    async fn create(&self, payload: NewContact) -> StoreResult<Contact>;
    async fn update(&self, id: ContactId, changes: ContactUpdate) -> StoreResult<Contact>;
    async fn delete(&self, id: ContactId) -> StoreResult<()>;
}

#[async_trait]
pub trait OfferStore: Send + Sync {
    async fn find_by_id(&self, id: OfferId) -> StoreResult<Option<Offer>>;

    /// List offers matching `filter` on `today`, ordered by `sort`.
    async fn list(
        &self,
        filter: OfferFilter,
        sort: OfferSort,
        today: NaiveDate,
    ) -> StoreResult<Vec<Offer>>;

    async fn create(&self, payload: NewOffer) -> StoreResult<Offer>;
    async fn update(&self, id: OfferId, changes: OfferUpdate) -> StoreResult<Offer>;
    async fn delete(&self, id: OfferId) -> StoreResult<()>;
}
