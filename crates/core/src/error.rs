//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more fields failed validation.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// All collected validation messages, if this is a validation failure.
    pub fn validation_messages(&self) -> Option<&[String]> {
        match self {
            Self::Validation(msgs) => Some(msgs),
            _ => None,
        }
    }
}

/// Collect field-level validation failures into a single result.
///
/// Returns `Ok(())` when `errors` is empty, otherwise a
/// [`DomainError::Validation`] carrying every message.
pub fn collect_validation(errors: Vec<String>) -> DomainResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_validation_empty_is_ok() {
        assert!(collect_validation(vec![]).is_ok());
    }

    #[test]
    fn collect_validation_keeps_all_messages() {
        let err = collect_validation(vec!["a".into(), "b".into()]).unwrap_err();
        assert_eq!(err.validation_messages().unwrap().len(), 2);
    }
}
