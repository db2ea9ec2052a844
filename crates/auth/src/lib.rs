//! `vendora-auth` — authentication/authorization boundary.
//!
//! Token issuing/verification, password hashing, the role model, and the
//! user credential entity. Intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{authorize, RoleDenied};
pub use claims::{validate_claims, TokenClaims, TokenValidationError};
pub use password::{hash_password, verify_password, PasswordError};
pub use roles::Role;
pub use token::{InvalidToken, TokenConfig, TokenService};
pub use user::{NewUser, User, UserUpdate};
