//! Session token issuing and verification.
//!
//! Tokens are stateless HS256 JWTs; validity is determined purely by
//! signature and expiry at verification time. There is no revocation: an
//! issued token stays valid until its natural expiry even if the underlying
//! credential is deactivated or deleted.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use vendora_core::UserId;

use crate::claims::{validate_claims, TokenClaims};
use crate::Role;

/// Fixed token validity window.
pub const DEFAULT_TTL_HOURS: i64 = 8;

/// Opaque verification failure.
///
/// Malformed tokens, bad signatures, unknown roles, and expired windows all
/// collapse into this single error so the protocol boundary cannot leak
/// which check failed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid or expired token")]
pub struct InvalidToken;

/// Immutable token service configuration, constructed once at startup and
/// passed by value. The signing secret is never read from ambient state.
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Issues and verifies signed session tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        // The library checks the signature; the time window is validated
        // manually against a caller-supplied clock so expiry is testable.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        Self {
            encoding_key,
            decoding_key,
            validation,
            ttl: config.ttl,
        }
    }

    /// Issue a token for `user_id` with `role`, expiring after the fixed TTL.
    pub fn issue(&self, user_id: UserId, role: Role) -> Result<String, InvalidToken> {
        self.issue_at(user_id, role, Utc::now())
    }

    /// Deterministic variant of [`issue`](Self::issue) for tests.
    pub fn issue_at(
        &self,
        user_id: UserId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, InvalidToken> {
        let claims = TokenClaims {
            sub: user_id,
            role,
            iat: now,
            exp: now + self.ttl,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| InvalidToken)
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, InvalidToken> {
        self.verify_at(token, Utc::now())
    }

    /// Deterministic variant of [`verify`](Self::verify) for tests.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, InvalidToken> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| InvalidToken)?;

        validate_claims(&data.claims, now).map_err(|_| InvalidToken)?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(TokenConfig::new("test-secret"))
    }

    #[test]
    fn issue_then_verify_returns_subject_and_role() {
        let svc = service();
        let token = svc.issue(UserId::new(7), Role::Manager).unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, UserId::new(7));
        assert_eq!(claims.role, Role::Manager);
    }

    #[test]
    fn verify_is_idempotent_for_unexpired_tokens() {
        let svc = service();
        let token = svc.issue(UserId::new(3), Role::Admin).unwrap();
        let first = svc.verify(&token).unwrap();
        let second = svc.verify(&token).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn expiry_is_issue_time_plus_ttl() {
        let svc = service();
        let now = Utc::now();
        let token = svc.issue_at(UserId::new(1), Role::User, now).unwrap();
        let claims = svc.verify_at(&token, now).unwrap();
        // Epoch-second serialization truncates sub-second precision.
        assert_eq!(
            claims.exp.timestamp(),
            (now + Duration::hours(DEFAULT_TTL_HOURS)).timestamp()
        );
    }

    #[test]
    fn token_expires_after_ttl_regardless_of_signature() {
        let svc = service();
        let issued = Utc::now();
        let token = svc.issue_at(UserId::new(7), Role::User, issued).unwrap();

        // Still valid just inside the window.
        let almost = issued + Duration::hours(DEFAULT_TTL_HOURS) - Duration::seconds(2);
        assert!(svc.verify_at(&token, almost).is_ok());

        // Invalid once the clock passes the fixed TTL.
        let past = issued + Duration::hours(DEFAULT_TTL_HOURS) + Duration::seconds(1);
        assert_eq!(svc.verify_at(&token, past), Err(InvalidToken));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let svc = service();
        let other = TokenService::new(TokenConfig::new("other-secret"));
        let token = svc.issue(UserId::new(1), Role::Admin).unwrap();
        assert_eq!(other.verify(&token), Err(InvalidToken));
    }

    #[test]
    fn malformed_token_fails_verification() {
        let svc = service();
        assert_eq!(svc.verify("not.a.jwt"), Err(InvalidToken));
        assert_eq!(svc.verify(""), Err(InvalidToken));
    }

    #[test]
    fn unknown_role_claim_fails_verification() {
        // A token signed with the right secret but a role outside the closed
        // set must be rejected at decode time.
        #[derive(serde::Serialize)]
        struct RogueClaims<'a> {
            sub: i64,
            role: &'a str,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now();
        let rogue = RogueClaims {
            sub: 1,
            role: "superuser",
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &rogue,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(service().verify(&token), Err(InvalidToken));
    }

    #[test]
    fn custom_ttl_is_honored() {
        let svc = TokenService::new(
            TokenConfig::new("test-secret").with_ttl(Duration::minutes(1)),
        );
        let now = Utc::now();
        let token = svc.issue_at(UserId::new(9), Role::User, now).unwrap();
        assert!(svc.verify_at(&token, now + Duration::seconds(30)).is_ok());
        assert!(svc.verify_at(&token, now + Duration::minutes(2)).is_err());
    }
}
