//! The single error type crossing the HTTP boundary.
//!
//! Error body shape: `{"message": string, "error"?: string,
//! "errors"?: [string]}`. Uniqueness violations map to 400, matching the
//! client's expectations for these endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use vendora_core::DomainError;
use vendora_infra::{LastAdminOp, StoreError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    /// A referenced parent row does not exist. `field` is the offending
    /// request field, e.g. `supplierId`.
    #[error("{message}")]
    InvalidReference {
        message: String,
        field: &'static str,
    },

    #[error("{0}")]
    LastAdminProtected(&'static str),

    #[error("Validation Error")]
    Validation(Vec<String>),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("storage failure: {0}")]
    Store(String),
}

impl ApiError {
    pub fn unauthenticated(message: &'static str) -> Self {
        Self::Unauthenticated(message)
    }

    pub fn forbidden(message: &'static str) -> Self {
        Self::Forbidden(message)
    }

    /// Referential validator rejection, e.g.
    /// `"Supplier with ID 9999 not found."` with field `supplierId`.
    pub fn invalid_reference(entity: &str, value: i64, field: &'static str) -> Self {
        Self::InvalidReference {
            message: format!("{entity} with ID {value} not found."),
            field,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidReference { .. }
            | ApiError::LastAdminProtected(_)
            | ApiError::Validation(_)
            | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            ApiError::InvalidReference { message, field } => {
                json!({ "message": message, "error": field })
            }
            ApiError::Validation(errors) => {
                json!({ "message": "Validation Error", "errors": errors })
            }
            ApiError::Store(detail) => {
                tracing::error!(%detail, "request failed in the storage layer");
                json!({ "message": "Internal server error" })
            }
            other => json!({ "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err.validation_messages() {
            Some(messages) => ApiError::Validation(messages.to_vec()),
            None => ApiError::Validation(vec![err.to_string()]),
        }
    }
}

/// Map a store failure, naming the entity for the miss/conflict cases.
pub fn store_error(err: StoreError, not_found: &'static str, conflict: &'static str) -> ApiError {
    match err {
        StoreError::NotFound => ApiError::NotFound(not_found),
        StoreError::Duplicate(_) => ApiError::Conflict(conflict),
        StoreError::ForeignKey(constraint) => {
            ApiError::Store(format!("unexpected foreign key violation: {constraint}"))
        }
        StoreError::LastAdmin(LastAdminOp::Deactivate) => {
            ApiError::LastAdminProtected("Cannot deactivate the only active admin user")
        }
        StoreError::LastAdmin(LastAdminOp::Delete) => {
            ApiError::LastAdminProtected("Cannot delete the only admin user")
        }
        StoreError::Backend(detail) => ApiError::Store(detail),
    }
}
