//! `vendora-api` — the HTTP surface.
//!
//! Every mutating request flows through the same pipeline: authentication
//! gate (bearer token middleware) -> authorization gate (allowed-role
//! layer on the route) -> referential validator (parent-exists checks in
//! the handler) -> store call -> JSON response.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
