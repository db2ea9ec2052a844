//! Response DTOs. Wire format is camelCase JSON; list responses are bare
//! arrays and detail responses bare objects. Contact and offer responses
//! embed the referenced parent rows the way the original client expects.

use chrono::{DateTime, Utc};
use serde::Serialize;

use vendora_auth::{Role, User};
use vendora_core::{ContactId, OfferId, ProductId, SupplierId, UserId};
use vendora_offers::Offer;
use vendora_products::Product;
use vendora_suppliers::{Contact, Supplier};

/// Full credential view, password hash excluded.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Slim credential view returned by register and login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierResponse {
    pub id: SupplierId,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Supplier> for SupplierResponse {
    fn from(s: &Supplier) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            contact_person: s.contact_person.clone(),
            email: s.email.clone(),
            phone: s.phone.clone(),
            address: s.address.clone(),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_of_measure: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for ProductResponse {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            description: p.description.clone(),
            category: p.category.clone(),
            unit_of_measure: p.unit_of_measure.clone(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Embedded parent reference.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRef {
    pub id: SupplierId,
    pub name: String,
}

impl From<&Supplier> for SupplierRef {
    fn from(s: &Supplier) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    pub id: ProductId,
    pub name: String,
    pub unit_of_measure: Option<String>,
}

impl From<&Product> for ProductRef {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            unit_of_measure: p.unit_of_measure.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub id: ContactId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub supplier_id: SupplierId,
    pub supplier: Option<SupplierRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContactResponse {
    pub fn new(contact: &Contact, supplier: Option<&Supplier>) -> Self {
        Self {
            id: contact.id,
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            job_title: contact.job_title.clone(),
            supplier_id: contact.supplier_id,
            supplier: supplier.map(SupplierRef::from),
            created_at: contact.created_at,
            updated_at: contact.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferResponse {
    pub id: OfferId,
    pub price_cents: i64,
    pub valid_from: chrono::NaiveDate,
    pub valid_to: chrono::NaiveDate,
    pub quantity: Option<i64>,
    pub notes: Option<String>,
    pub supplier_id: SupplierId,
    pub product_id: ProductId,
    pub supplier: Option<SupplierRef>,
    pub product: Option<ProductRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OfferResponse {
    pub fn new(offer: &Offer, supplier: Option<&Supplier>, product: Option<&Product>) -> Self {
        Self {
            id: offer.id,
            price_cents: offer.price_cents,
            valid_from: offer.valid_from,
            valid_to: offer.valid_to,
            quantity: offer.quantity,
            notes: offer.notes.clone(),
            supplier_id: offer.supplier_id,
            product_id: offer.product_id,
            supplier: supplier.map(SupplierRef::from),
            product: product.map(ProductRef::from),
            created_at: offer.created_at,
            updated_at: offer.updated_at,
        }
    }
}
