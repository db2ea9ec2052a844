//! HTTP application wiring (axum router + store wiring).
//!
//! - `routes/`: handlers, one file per resource area
//! - `dto.rs`: response DTOs and JSON mapping
//! - `errors.rs`: the boundary error type and store-error mapping
//! - `extract.rs`: request-body extractor with enveloped rejections

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use vendora_auth::TokenService;
use vendora_infra::{ContactStore, OfferStore, ProductStore, SupplierStore, UserStore};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;

/// Shared application state: one store handle per entity plus the token
/// service. All handles usually point at the same backend.
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub suppliers: Arc<dyn SupplierStore>,
    pub products: Arc<dyn ProductStore>,
    pub contacts: Arc<dyn ContactStore>,
    pub offers: Arc<dyn OfferStore>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, tokens: Arc<TokenService>) -> Self
    where
        S: UserStore + SupplierStore + ProductStore + ContactStore + OfferStore + 'static,
    {
        Self {
            users: store.clone(),
            suppliers: store.clone(),
            products: store.clone(),
            contacts: store.clone(),
            offers: store,
            tokens,
        }
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs` and
/// the black-box tests).
pub fn build_app(state: AppState) -> Router {
    let auth_state = middleware::AuthState {
        tokens: state.tokens.clone(),
    };
    let state = Arc::new(state);

    // Everything except the landing page and register/login sits behind
    // the authentication gate.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::authenticate,
    ));

    Router::new()
        .route("/api", get(routes::system::landing))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .merge(protected)
        .layer(Extension(state))
}
