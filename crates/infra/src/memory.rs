//! In-memory store for tests and development.
//!
//! One `RwLock` over all tables; every mutation runs inside a single write
//! section, which is what makes the last-admin guard and the cascades
//! atomic here.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use vendora_auth::{Role, User, UserUpdate};
use vendora_core::{ContactId, OfferId, ProductId, SupplierId, UserId};
use vendora_offers::{NewOffer, Offer, OfferFilter, OfferSort, OfferUpdate};
use vendora_products::{NewProduct, Product, ProductUpdate};
use vendora_suppliers::{Contact, ContactUpdate, NewContact, NewSupplier, Supplier, SupplierUpdate};

use crate::error::{LastAdminOp, StoreError, StoreResult};
use crate::store::{
    ContactStore, NewUserRecord, OfferStore, ProductStore, SupplierStore, UserStore,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    suppliers: BTreeMap<i64, Supplier>,
    products: BTreeMap<i64, Product>,
    contacts: BTreeMap<i64, Contact>,
    offers: BTreeMap<i64, Offer>,
    next_id: i64,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory implementation of every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> StoreResult<T> {
        let tables = self
            .inner
            .read()
            .map_err(|_| StoreError::backend("store lock poisoned"))?;
        Ok(f(&tables))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> StoreResult<T>) -> StoreResult<T> {
        let mut tables = self
            .inner
            .write()
            .map_err(|_| StoreError::backend("store lock poisoned"))?;
        f(&mut tables)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        self.read(|t| t.users.get(&id.as_i64()).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.read(|t| t.users.values().find(|u| u.username == username).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        self.read(|t| t.users.values().cloned().collect())
    }

    async fn create(&self, record: NewUserRecord) -> StoreResult<User> {
        self.write(|t| {
            let taken = t.users.values().any(|u| {
                u.username == record.username || u.email == record.email
            });
            if taken {
                return Err(StoreError::Duplicate("users.username, users.email".into()));
            }
            let now = Utc::now();
            let user = User {
                id: UserId::new(t.allocate_id()),
                username: record.username,
                email: record.email,
                password_hash: record.password_hash,
                role: record.role,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            t.users.insert(user.id.as_i64(), user.clone());
            Ok(user)
        })
    }

    async fn update(&self, id: UserId, changes: UserUpdate) -> StoreResult<User> {
        self.write(|t| {
            let current = t.users.get(&id.as_i64()).ok_or(StoreError::NotFound)?.clone();

            // Guard and write happen under the same write lock, so two
            // concurrent deactivations cannot both pass the count.
            if current.role == Role::Admin && changes.deactivates() {
                let other_active_admins = t
                    .users
                    .values()
                    .filter(|u| u.id != id && u.is_active_admin())
                    .count();
                if other_active_admins == 0 {
                    return Err(StoreError::LastAdmin(LastAdminOp::Deactivate));
                }
            }

            if let Some(username) = &changes.username {
                if t.users.values().any(|u| u.id != id && &u.username == username) {
                    return Err(StoreError::Duplicate("users.username".into()));
                }
            }
            if let Some(email) = &changes.email {
                if t.users.values().any(|u| u.id != id && &u.email == email) {
                    return Err(StoreError::Duplicate("users.email".into()));
                }
            }

            let mut user = current;
            user.apply(changes, Utc::now());
            t.users.insert(id.as_i64(), user.clone());
            Ok(user)
        })
    }

    async fn delete(&self, id: UserId) -> StoreResult<()> {
        self.write(|t| {
            let target = t.users.get(&id.as_i64()).ok_or(StoreError::NotFound)?;
            if target.role == Role::Admin {
                let other_admins = t
                    .users
                    .values()
                    .filter(|u| u.id != id && u.role == Role::Admin)
                    .count();
                if other_admins == 0 {
                    return Err(StoreError::LastAdmin(LastAdminOp::Delete));
                }
            }
            t.users.remove(&id.as_i64());
            Ok(())
        })
    }
}

#[async_trait]
impl SupplierStore for MemoryStore {
    async fn find_by_id(&self, id: SupplierId) -> StoreResult<Option<Supplier>> {
        self.read(|t| t.suppliers.get(&id.as_i64()).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Supplier>> {
        self.read(|t| t.suppliers.values().cloned().collect())
    }

    async fn create(&self, payload: NewSupplier) -> StoreResult<Supplier> {
        self.write(|t| {
            if t.suppliers.values().any(|s| s.email == payload.email) {
                return Err(StoreError::Duplicate("suppliers.email".into()));
            }
            let supplier = Supplier::create(SupplierId::new(t.allocate_id()), payload, Utc::now());
            t.suppliers.insert(supplier.id.as_i64(), supplier.clone());
            Ok(supplier)
        })
    }

    async fn update(&self, id: SupplierId, changes: SupplierUpdate) -> StoreResult<Supplier> {
        self.write(|t| {
            if let Some(email) = &changes.email {
                if t.suppliers.values().any(|s| s.id != id && &s.email == email) {
                    return Err(StoreError::Duplicate("suppliers.email".into()));
                }
            }
            let supplier = t.suppliers.get_mut(&id.as_i64()).ok_or(StoreError::NotFound)?;
            supplier.apply(changes, Utc::now());
            Ok(supplier.clone())
        })
    }

    async fn delete(&self, id: SupplierId) -> StoreResult<()> {
        self.write(|t| {
            if t.suppliers.remove(&id.as_i64()).is_none() {
                return Err(StoreError::NotFound);
            }
            // Emulates the schema's ON DELETE CASCADE.
            t.contacts.retain(|_, c| c.supplier_id != id);
            t.offers.retain(|_, o| o.supplier_id != id);
            Ok(())
        })
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
        self.read(|t| t.products.get(&id.as_i64()).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Product>> {
        self.read(|t| t.products.values().cloned().collect())
    }

    async fn create(&self, payload: NewProduct) -> StoreResult<Product> {
        self.write(|t| {
            let name = payload.name.trim();
            if t.products.values().any(|p| p.name == name) {
                return Err(StoreError::Duplicate("products.name".into()));
            }
            let product = Product::create(ProductId::new(t.allocate_id()), payload, Utc::now());
            t.products.insert(product.id.as_i64(), product.clone());
            Ok(product)
        })
    }

    async fn update(&self, id: ProductId, changes: ProductUpdate) -> StoreResult<Product> {
        self.write(|t| {
            if let Some(name) = &changes.name {
                let name = name.trim();
                if t.products.values().any(|p| p.id != id && p.name == name) {
                    return Err(StoreError::Duplicate("products.name".into()));
                }
            }
            let product = t.products.get_mut(&id.as_i64()).ok_or(StoreError::NotFound)?;
            product.apply(changes, Utc::now());
            Ok(product.clone())
        })
    }

    async fn delete(&self, id: ProductId) -> StoreResult<()> {
        self.write(|t| {
            if t.products.remove(&id.as_i64()).is_none() {
                return Err(StoreError::NotFound);
            }
            t.offers.retain(|_, o| o.product_id != id);
            Ok(())
        })
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn find_by_id(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        self.read(|t| t.contacts.get(&id.as_i64()).cloned())
    }

    async fn list(&self, supplier_id: Option<SupplierId>) -> StoreResult<Vec<Contact>> {
        self.read(|t| {
            t.contacts
                .values()
                .filter(|c| supplier_id.is_none_or(|s| c.supplier_id == s))
                .cloned()
                .collect()
        })
    }

    async fn create(&self, payload: NewContact) -> StoreResult<Contact> {
        self.write(|t| {
            if !t.suppliers.contains_key(&payload.supplier_id.as_i64()) {
                return Err(StoreError::ForeignKey("contacts.supplier_id".into()));
            }
            if t.contacts.values().any(|c| c.email == payload.email) {
                return Err(StoreError::Duplicate("contacts.email".into()));
            }
            let contact = Contact::create(ContactId::new(t.allocate_id()), payload, Utc::now());
            t.contacts.insert(contact.id.as_i64(), contact.clone());
            Ok(contact)
        })
    }

    async fn update(&self, id: ContactId, changes: ContactUpdate) -> StoreResult<Contact> {
        self.write(|t| {
            if let Some(supplier_id) = changes.supplier_id {
                if !t.suppliers.contains_key(&supplier_id.as_i64()) {
                    return Err(StoreError::ForeignKey("contacts.supplier_id".into()));
                }
            }
            if let Some(email) = &changes.email {
                if t.contacts.values().any(|c| c.id != id && &c.email == email) {
                    return Err(StoreError::Duplicate("contacts.email".into()));
                }
            }
            let contact = t.contacts.get_mut(&id.as_i64()).ok_or(StoreError::NotFound)?;
            contact.apply(changes, Utc::now());
            Ok(contact.clone())
        })
    }

    async fn delete(&self, id: ContactId) -> StoreResult<()> {
        self.write(|t| {
            t.contacts
                .remove(&id.as_i64())
                .map(|_| ())
                .ok_or(StoreError::NotFound)
        })
    }
}

#[async_trait]
impl OfferStore for MemoryStore {
    async fn find_by_id(&self, id: OfferId) -> StoreResult<Option<Offer>> {
        self.read(|t| t.offers.get(&id.as_i64()).cloned())
    }

    async fn list(
        &self,
        filter: OfferFilter,
        sort: OfferSort,
        today: NaiveDate,
    ) -> StoreResult<Vec<Offer>> {
        self.read(|t| {
            let mut offers: Vec<Offer> = t
                .offers
                .values()
                .filter(|o| filter.matches(o, today))
                .cloned()
                .collect();
            offers.sort_by(|a, b| sort.compare(a, b));
            offers
        })
    }

    async fn create(&self, payload: NewOffer) -> StoreResult<Offer> {
        self.write(|t| {
            if !t.suppliers.contains_key(&payload.supplier_id.as_i64()) {
                return Err(StoreError::ForeignKey("offers.supplier_id".into()));
            }
            if !t.products.contains_key(&payload.product_id.as_i64()) {
                return Err(StoreError::ForeignKey("offers.product_id".into()));
            }
            let offer = Offer::create(OfferId::new(t.allocate_id()), payload, Utc::now());
            t.offers.insert(offer.id.as_i64(), offer.clone());
            Ok(offer)
        })
    }

    async fn update(&self, id: OfferId, changes: OfferUpdate) -> StoreResult<Offer> {
        self.write(|t| {
            if let Some(supplier_id) = changes.supplier_id {
                if !t.suppliers.contains_key(&supplier_id.as_i64()) {
                    return Err(StoreError::ForeignKey("offers.supplier_id".into()));
                }
            }
            if let Some(product_id) = changes.product_id {
                if !t.products.contains_key(&product_id.as_i64()) {
                    return Err(StoreError::ForeignKey("offers.product_id".into()));
                }
            }
            let offer = t.offers.get_mut(&id.as_i64()).ok_or(StoreError::NotFound)?;
            offer.apply(changes, Utc::now());
            Ok(offer.clone())
        })
    }

    async fn delete(&self, id: OfferId) -> StoreResult<()> {
        self.write(|t| {
            t.offers
                .remove(&id.as_i64())
                .map(|_| ())
                .ok_or(StoreError::NotFound)
        })
    }
}
