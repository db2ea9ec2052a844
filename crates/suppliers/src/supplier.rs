use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vendora_core::{collect_validation, DomainResult, SupplierId};

use crate::valid_email;

/// A supplier the organization buys from.
///
/// Email is unique across suppliers; uniqueness is owned by the persistence
/// layer, shape validation happens here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    /// Construct from a validated creation payload; `id` comes from the
    /// persistence layer.
    pub fn create(id: SupplierId, payload: NewSupplier, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: payload.name.trim().to_string(),
            contact_person: payload.contact_person,
            email: payload.email.trim().to_string(),
            phone: payload.phone,
            address: payload.address,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place. Caller validates first.
    pub fn apply(&mut self, update: SupplierUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(contact_person) = update.contact_person {
            self.contact_person = Some(contact_person);
        }
        if let Some(email) = update.email {
            self.email = email.trim().to_string();
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(address) = update.address {
            self.address = Some(address);
        }
        self.updated_at = now;
    }
}

/// Creation payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    pub name: String,
    pub contact_person: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl NewSupplier {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("name is required".to_string());
        }
        if !valid_email(&self.email) {
            errors.push("email must be a valid email address".to_string());
        }
        collect_validation(errors)
    }
}

/// Partial update payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierUpdate {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl SupplierUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                errors.push("name must not be empty".to_string());
            }
        }
        if let Some(email) = &self.email {
            if !valid_email(email) {
                errors.push("email must be a valid email address".to_string());
            }
        }
        collect_validation(errors)
    }
}
