use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vendora_core::UserId;

use crate::Role;

/// JWT claims model (transport-agnostic).
///
/// `iat`/`exp` are serialized as Unix-epoch seconds, the standard JWT
/// representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the credential this token was issued for.
    pub sub: UserId,

    /// Role granted to the subject at issue time.
    pub role: Role,

    /// Issued-at timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    /// Expiration timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate the claim time window against `now`.
///
/// Signature verification / decoding is the token service's job; this checks
/// the *claims* only, with a caller-supplied clock so expiry is testable.
pub fn validate_claims(
    claims: &TokenClaims,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn claims_at(iat: DateTime<Utc>, exp: DateTime<Utc>) -> TokenClaims {
        TokenClaims {
            sub: UserId::new(7),
            role: Role::User,
            iat,
            exp,
        }
    }

    #[test]
    fn accepts_claims_inside_window() {
        let now = Utc::now();
        let claims = claims_at(now - Duration::minutes(1), now + Duration::hours(8));
        assert!(validate_claims(&claims, now).is_ok());
    }

    #[test]
    fn rejects_expired_claims() {
        let now = Utc::now();
        let claims = claims_at(now - Duration::hours(9), now - Duration::hours(1));
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn rejects_claims_issued_in_the_future() {
        let now = Utc::now();
        let claims = claims_at(now + Duration::minutes(5), now + Duration::hours(8));
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn rejects_inverted_window() {
        let now = Utc::now();
        let claims = claims_at(now, now - Duration::seconds(1));
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn epoch_second_serde_round_trip() {
        let now = Utc::now();
        let claims = claims_at(now - Duration::minutes(1), now + Duration::hours(8));
        let json = serde_json::to_value(claims).unwrap();
        assert!(json["iat"].is_i64());
        assert!(json["exp"].is_i64());
        let back: TokenClaims = serde_json::from_value(json).unwrap();
        assert_eq!(back.sub, claims.sub);
        assert_eq!(back.role, claims.role);
    }
}
