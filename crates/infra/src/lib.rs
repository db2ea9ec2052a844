//! `vendora-infra` — the persistence collaborator.
//!
//! One async store trait per entity, with two implementations: an in-memory
//! store for tests/dev and a Postgres store for production. The last-admin
//! guard is an atomic store operation in both.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{LastAdminOp, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{ContactStore, NewUserRecord, OfferStore, ProductStore, SupplierStore, UserStore};
