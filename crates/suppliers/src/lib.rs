//! `vendora-suppliers` — supplier and supplier-contact entities.
//!
//! Pure domain types with validated payloads; persistence lives in
//! `vendora-infra`.

pub mod contact;
pub mod supplier;

pub use contact::{Contact, ContactUpdate, NewContact};
pub use supplier::{NewSupplier, Supplier, SupplierUpdate};

pub(crate) fn valid_email(s: &str) -> bool {
    let s = s.trim();
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}
