//! Per-request context inserted by the authentication gate.

use vendora_auth::Role;
use vendora_core::UserId;

/// Identity of the verified caller, available to handlers and to the
/// role gate via request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub role: Role,
}
