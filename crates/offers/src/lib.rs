//! `vendora-offers` — price offer entity, active-window logic, and the
//! filter/sort types used by offer listings and reports.

pub mod offer;
pub mod query;

pub use offer::{NewOffer, Offer, OfferUpdate};
pub use query::{OfferFilter, OfferSort, OfferSortField, ReportFilter, ReportStatus, SortOrder};
