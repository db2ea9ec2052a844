//! `vendora-products` — product catalog entity.

pub mod product;

pub use product::{NewProduct, Product, ProductUpdate};
