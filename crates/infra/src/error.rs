//! Storage error model.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Which guarded operation tripped the last-admin protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastAdminOp {
    Deactivate,
    Delete,
}

/// Storage-level error.
///
/// Domain validation never reaches this layer; these are the failures the
/// backing store itself can signal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The addressed row does not exist.
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint was violated.
    #[error("duplicate value: {0}")]
    Duplicate(String),

    /// A foreign key did not resolve at commit time.
    #[error("foreign key violation: {0}")]
    ForeignKey(String),

    /// The operation would leave zero active admin credentials.
    #[error("operation refused: would remove the last admin")]
    LastAdmin(LastAdminOp),

    /// The backend rejected the operation or is unreachable.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
