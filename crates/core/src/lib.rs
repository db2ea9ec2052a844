//! `vendora-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{collect_validation, DomainError, DomainResult};
pub use id::{ContactId, OfferId, ProductId, SupplierId, UserId};
