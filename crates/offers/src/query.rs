//! Filter and sort types for offer listings and reports.
//!
//! The matching logic lives here so every store backend filters the same
//! way; SQL backends may push the equivalent predicates into the query.

use chrono::NaiveDate;
use core::cmp::Ordering;
use core::str::FromStr;
use serde::Deserialize;

use vendora_core::{ProductId, SupplierId};

use crate::Offer;

/// Listing filter for `GET /offers`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfferFilter {
    pub supplier_id: Option<SupplierId>,
    pub product_id: Option<ProductId>,
    /// `Some(true)` keeps only offers active on `today`; `Some(false)` keeps
    /// only inactive ones (not yet started or already ended).
    pub active: Option<bool>,
}

impl OfferFilter {
    pub fn matches(&self, offer: &Offer, today: NaiveDate) -> bool {
        if let Some(supplier_id) = self.supplier_id {
            if offer.supplier_id != supplier_id {
                return false;
            }
        }
        if let Some(product_id) = self.product_id {
            if offer.product_id != product_id {
                return false;
            }
        }
        if let Some(active) = self.active {
            if offer.is_active_on(today) != active {
                return false;
            }
        }
        true
    }
}

/// Sortable offer columns. Unknown sort keys fall back to `CreatedAt`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OfferSortField {
    #[default]
    CreatedAt,
    PriceCents,
    ValidFrom,
    ValidTo,
    Quantity,
}

impl FromStr for OfferSortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(Self::CreatedAt),
            "priceCents" | "price" => Ok(Self::PriceCents),
            "validFrom" => Ok(Self::ValidFrom),
            "validTo" => Ok(Self::ValidTo),
            "quantity" => Ok(Self::Quantity),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Case-insensitive like the query strings it comes from.
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(()),
        }
    }
}

/// Combined sort specification; default is newest-first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfferSort {
    pub field: OfferSortField,
    pub order: SortOrder,
}

impl OfferSort {
    pub fn compare(&self, a: &Offer, b: &Offer) -> Ordering {
        let ordering = match self.field {
            OfferSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            OfferSortField::PriceCents => a.price_cents.cmp(&b.price_cents),
            OfferSortField::ValidFrom => a.valid_from.cmp(&b.valid_from),
            OfferSortField::ValidTo => a.valid_to.cmp(&b.valid_to),
            OfferSortField::Quantity => a.quantity.cmp(&b.quantity),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Status filter for the offers report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Validity window has not ended yet (`valid_to >= today`).
    Active,
    /// Validity window has ended (`valid_to < today`).
    Expired,
}

/// Filter for `GET /reports/offers`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub supplier_id: Option<SupplierId>,
    pub product_id: Option<ProductId>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: Option<ReportStatus>,
}

impl ReportFilter {
    pub fn matches(&self, offer: &Offer, today: NaiveDate) -> bool {
        if let Some(supplier_id) = self.supplier_id {
            if offer.supplier_id != supplier_id {
                return false;
            }
        }
        if let Some(product_id) = self.product_id {
            if offer.product_id != product_id {
                return false;
            }
        }
        if let Some(date_from) = self.date_from {
            if offer.valid_from < date_from {
                return false;
            }
        }
        if let Some(date_to) = self.date_to {
            if offer.valid_to > date_to {
                return false;
            }
        }
        match self.status {
            Some(ReportStatus::Active) => offer.valid_to >= today,
            Some(ReportStatus::Expired) => offer.valid_to < today,
            None => true,
        }
    }
}
