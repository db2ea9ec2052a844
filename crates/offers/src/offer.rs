use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use vendora_core::{collect_validation, DomainResult, OfferId, ProductId, SupplierId};

/// A supplier's price offer for a product over a validity window.
///
/// Money is kept in the smallest currency unit. Both foreign keys are
/// checked against existing rows in the write pipeline; deleting either
/// parent cascades to the offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub price_cents: i64,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub quantity: Option<i64>,
    pub notes: Option<String>,
    pub supplier_id: SupplierId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    pub fn create(id: OfferId, payload: NewOffer, now: DateTime<Utc>) -> Self {
        Self {
            id,
            price_cents: payload.price_cents,
            valid_from: payload.valid_from,
            valid_to: payload.valid_to,
            quantity: payload.quantity,
            notes: payload.notes,
            supplier_id: payload.supplier_id,
            product_id: payload.product_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// An offer is active on `today` when `valid_from <= today <= valid_to`.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.valid_from <= today && today <= self.valid_to
    }

    pub fn apply(&mut self, update: OfferUpdate, now: DateTime<Utc>) {
        if let Some(price_cents) = update.price_cents {
            self.price_cents = price_cents;
        }
        if let Some(valid_from) = update.valid_from {
            self.valid_from = valid_from;
        }
        if let Some(valid_to) = update.valid_to {
            self.valid_to = valid_to;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = Some(quantity);
        }
        if let Some(notes) = update.notes {
            self.notes = Some(notes);
        }
        if let Some(supplier_id) = update.supplier_id {
            self.supplier_id = supplier_id;
        }
        if let Some(product_id) = update.product_id {
            self.product_id = product_id;
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOffer {
    pub price_cents: i64,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub quantity: Option<i64>,
    pub notes: Option<String>,
    pub supplier_id: SupplierId,
    pub product_id: ProductId,
}

impl NewOffer {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        if self.price_cents <= 0 {
            errors.push("priceCents must be greater than zero".to_string());
        }
        if self.valid_to < self.valid_from {
            errors.push("validTo must not be before validFrom".to_string());
        }
        if let Some(quantity) = self.quantity {
            if quantity < 1 {
                errors.push("quantity must be at least 1".to_string());
            }
        }
        collect_validation(errors)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferUpdate {
    pub price_cents: Option<i64>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub quantity: Option<i64>,
    pub notes: Option<String>,
    pub supplier_id: Option<SupplierId>,
    pub product_id: Option<ProductId>,
}

impl OfferUpdate {
    /// Validate the fields present in the payload. The window check runs on
    /// the merged result in the handler, since either bound may be absent.
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        if let Some(price_cents) = self.price_cents {
            if price_cents <= 0 {
                errors.push("priceCents must be greater than zero".to_string());
            }
        }
        if let Some(quantity) = self.quantity {
            if quantity < 1 {
                errors.push("quantity must be at least 1".to_string());
            }
        }
        if let (Some(from), Some(to)) = (self.valid_from, self.valid_to) {
            if to < from {
                errors.push("validTo must not be before validFrom".to_string());
            }
        }
        collect_validation(errors)
    }
}
