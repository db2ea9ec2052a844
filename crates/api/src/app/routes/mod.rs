use axum::{routing::get, Router};

pub mod admin;
pub mod auth;
pub mod common;
pub mod contacts;
pub mod offers;
pub mod products;
pub mod reports;
pub mod suppliers;
pub mod system;

/// Router for every authenticated endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/api/auth/me", get(auth::me))
        .nest("/api/suppliers", suppliers::router())
        .nest("/api/products", products::router())
        .nest("/api/contacts", contacts::router())
        .nest("/api/offers", offers::router())
        .nest("/api/admin", admin::router())
        .nest("/api/reports", reports::router())
}
