use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vendora_core::{collect_validation, DomainResult, ProductId};

/// A purchasable product.
///
/// Name is unique across the catalog (enforced by the persistence layer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_of_measure: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn create(id: ProductId, payload: NewProduct, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: payload.name.trim().to_string(),
            description: payload.description,
            category: payload.category,
            unit_of_measure: payload.unit_of_measure,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: ProductUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        if let Some(unit_of_measure) = update.unit_of_measure {
            self.unit_of_measure = Some(unit_of_measure);
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_of_measure: Option<String>,
}

impl NewProduct {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("name is required".to_string());
        }
        collect_validation(errors)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_of_measure: Option<String>,
}

impl ProductUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                errors.push("name must not be empty".to_string());
            }
        }
        collect_validation(errors)
    }
}
