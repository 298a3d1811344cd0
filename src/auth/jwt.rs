//! Session token issue and validation (JWT with a `jti` for revocation).

use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // account id
    pub jti: String, // token id, the unit of revocation
    pub exp: i64,
    pub iat: i64,
}

/// A freshly minted session token together with the claims the service
/// needs to track it.
#[derive(Debug)]
pub struct IssuedToken {
    pub token: String,
    pub jti: Uuid,
    pub expires_at: i64,
}

/// Decoded claims of a presented token, after signature and expiry checks.
#[derive(Debug, Clone, Copy)]
pub struct SessionClaims {
    pub account_id: Uuid,
    pub jti: Uuid,
    pub expires_at: i64,
}

impl SessionClaims {
    /// Seconds until natural expiry, floored at 1 so a revocation record
    /// for a nearly expired token still outlives it.
    pub fn remaining_ttl(&self) -> i64 {
        (self.expires_at - Utc::now().timestamp()).max(1)
    }
}

#[derive(Clone)]
pub struct JwtSecret {
    secret: String,
    ttl: Duration,
}

impl JwtSecret {
    pub fn new(secret: String, ttl_minutes: i64) -> Self {
        Self {
            secret,
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn issue(&self, account_id: Uuid) -> AppResult<IssuedToken> {
        let now = Utc::now();
        let jti = Uuid::new_v4();
        let expires_at = (now + self.ttl).timestamp();
        let claims = Claims {
            sub: account_id.to_string(),
            jti: jti.to_string(),
            exp: expires_at,
            iat: now.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Auth(e.to_string()))?;
        Ok(IssuedToken {
            token,
            jti,
            expires_at,
        })
    }

    pub fn validate(&self, token: &str) -> AppResult<SessionClaims> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        self.decode_with(token, validation)
    }

    /// Decode claims without requiring the token to be unexpired. Logout uses
    /// this: revoking an expired token is a harmless no-op, not an error.
    pub fn decode_lenient(&self, token: &str) -> AppResult<SessionClaims> {
        let mut validation = Validation::default();
        validation.validate_exp = false;
        self.decode_with(token, validation)
    }

    fn decode_with(&self, token: &str, validation: Validation) -> AppResult<SessionClaims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AppError::Auth(e.to_string()))?;
        let account_id =
            Uuid::parse_str(&data.claims.sub).map_err(|e| AppError::Auth(e.to_string()))?;
        let jti = Uuid::parse_str(&data.claims.jti).map_err(|e| AppError::Auth(e.to_string()))?;
        Ok(SessionClaims {
            account_id,
            jti,
            expires_at: data.claims.exp,
        })
    }
}
