//! User credential entity and its validated payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vendora_core::{collect_validation, DomainResult, UserId};

use crate::Role;

/// Persisted user credential.
///
/// `password_hash` is an Argon2id hash computed at registration; the raw
/// secret is never stored. The resource-handler layer keeps the invariant
/// that at least one active admin credential exists at all times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Apply a partial update in place. Caller validates first; the
    /// last-admin guard runs in the store, not here.
    pub fn apply(&mut self, update: UserUpdate, now: DateTime<Utc>) {
        if let Some(username) = update.username {
            self.username = username.trim().to_string();
        }
        if let Some(email) = update.email {
            self.email = email.trim().to_string();
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }

    pub fn is_active_admin(&self) -> bool {
        self.role == Role::Admin && self.is_active
    }
}

/// Registration payload (raw password, hashed before storage).
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

impl NewUser {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        let username = self.username.trim();
        if username.len() < 3 || username.len() > 50 {
            errors.push("username must be between 3 and 50 characters".to_string());
        }
        if !valid_email(&self.email) {
            errors.push("email must be a valid email address".to_string());
        }
        if self.password.is_empty() {
            errors.push("password must not be empty".to_string());
        }
        collect_validation(errors)
    }

    /// Role defaults to `user` when the caller supplies none.
    pub fn role_or_default(&self) -> Role {
        self.role.unwrap_or(Role::User)
    }
}

/// Partial update applied by the admin user endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UserUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        if let Some(username) = &self.username {
            let username = username.trim();
            if username.len() < 3 || username.len() > 50 {
                errors.push("username must be between 3 and 50 characters".to_string());
            }
        }
        if let Some(email) = &self.email {
            if !valid_email(email) {
                errors.push("email must be a valid email address".to_string());
            }
        }
        collect_validation(errors)
    }

    /// True when this update would deactivate the credential.
    pub fn deactivates(&self) -> bool {
        self.is_active == Some(false)
    }
}

fn valid_email(s: &str) -> bool {
    let s = s.trim();
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user() -> NewUser {
        NewUser {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret".to_string(),
            role: None,
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(new_user().validate().is_ok());
        assert_eq!(new_user().role_or_default(), Role::User);
    }

    #[test]
    fn caller_chosen_role_is_kept() {
        let mut payload = new_user();
        payload.role = Some(Role::Manager);
        assert_eq!(payload.role_or_default(), Role::Manager);
    }

    #[test]
    fn short_username_and_bad_email_collect_both_errors() {
        let payload = NewUser {
            username: "ab".to_string(),
            email: "nope".to_string(),
            password: "secret".to_string(),
            role: None,
        };
        let err = payload.validate().unwrap_err();
        assert_eq!(err.validation_messages().unwrap().len(), 2);
    }

    #[test]
    fn empty_password_is_rejected() {
        let mut payload = new_user();
        payload.password.clear();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn email_needs_text_on_both_sides_of_at() {
        for bad in ["@example.com", "alice@", "alice"] {
            let mut payload = new_user();
            payload.email = bad.to_string();
            assert!(payload.validate().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn partial_update_only_validates_present_fields() {
        let update = UserUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
        assert!(update.deactivates());

        let update = UserUpdate {
            email: Some("broken".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
