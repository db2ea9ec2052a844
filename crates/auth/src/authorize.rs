//! Pure role-check used by the HTTP authorization gate.

use thiserror::Error;

use crate::Role;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("insufficient permissions")]
pub struct RoleDenied;

/// Check a caller's role against a route's allowed-role set.
///
/// No IO, no panics; the HTTP layer turns `RoleDenied` into its 403 body.
pub fn authorize(role: Role, allowed: &[Role]) -> Result<(), RoleDenied> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(RoleDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_in_set_is_allowed() {
        assert!(authorize(Role::Manager, &[Role::Admin, Role::Manager]).is_ok());
    }

    #[test]
    fn role_outside_set_is_denied() {
        assert_eq!(
            authorize(Role::User, &[Role::Admin, Role::Manager]),
            Err(RoleDenied)
        );
    }

    #[test]
    fn empty_set_denies_everyone() {
        for role in [Role::Admin, Role::Manager, Role::User] {
            assert!(authorize(role, &[]).is_err());
        }
    }
}
