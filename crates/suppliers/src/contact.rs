use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vendora_core::{collect_validation, ContactId, DomainResult, SupplierId};

use crate::valid_email;

/// A person working for a supplier.
///
/// `supplier_id` must reference an existing supplier; that referential check
/// runs in the write pipeline before persistence, and deleting the supplier
/// cascades to its contacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub supplier_id: SupplierId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn create(id: ContactId, payload: NewContact, now: DateTime<Utc>) -> Self {
        Self {
            id,
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            email: payload.email.trim().to_string(),
            phone: payload.phone,
            job_title: payload.job_title,
            supplier_id: payload.supplier_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: ContactUpdate, now: DateTime<Utc>) {
        if let Some(first_name) = update.first_name {
            self.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name.trim().to_string();
        }
        if let Some(email) = update.email {
            self.email = email.trim().to_string();
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(job_title) = update.job_title {
            self.job_title = Some(job_title);
        }
        if let Some(supplier_id) = update.supplier_id {
            self.supplier_id = supplier_id;
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub supplier_id: SupplierId,
}

impl NewContact {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        if self.first_name.trim().is_empty() {
            errors.push("firstName is required".to_string());
        }
        if self.last_name.trim().is_empty() {
            errors.push("lastName is required".to_string());
        }
        if !valid_email(&self.email) {
            errors.push("email must be a valid email address".to_string());
        }
        collect_validation(errors)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub supplier_id: Option<SupplierId>,
}

impl ContactUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        if let Some(first_name) = &self.first_name {
            if first_name.trim().is_empty() {
                errors.push("firstName must not be empty".to_string());
            }
        }
        if let Some(last_name) = &self.last_name {
            if last_name.trim().is_empty() {
                errors.push("lastName must not be empty".to_string());
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
