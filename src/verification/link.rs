//! Signed verification links: HMAC-SHA256 over `account_id:expires`.

use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// A generated link: the account it targets, its expiry, and the signature
/// covering both.
#[derive(Debug, Clone)]
pub struct SignedLink {
    pub account_id: Uuid,
    pub expires: i64,
    pub signature: String,
}

impl SignedLink {
    /// Full URL for the verification email.
    pub fn url(&self, base: &str) -> String {
        format!(
            "{}/email/verify/{}?expires={}&signature={}",
            base.trim_end_matches('/'),
            self.account_id,
            self.expires,
            self.signature
        )
    }
}

/// Signs and verifies email verification links.
#[derive(Clone)]
pub struct LinkSigner {
    secret: String,
    ttl: Duration,
}

impl LinkSigner {
    pub fn new(secret: String, ttl_hours: i64) -> Self {
        Self {
            secret,
            ttl: Duration::hours(ttl_hours),
        }
    }

    fn signature_for(&self, account_id: Uuid, expires: i64) -> AppResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init: {}", e)))?;
        mac.update(format!("{}:{}", account_id, expires).as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Generate a fresh link for `account_id`, expiring after the configured TTL.
    pub fn sign(&self, account_id: Uuid) -> AppResult<SignedLink> {
        let expires = (Utc::now() + self.ttl).timestamp();
        let signature = self.signature_for(account_id, expires)?;
        Ok(SignedLink {
            account_id,
            expires,
            signature,
        })
    }

    /// Check a presented link. Fails if expired or if the signature does not
    /// match this account id and expiry.
    pub fn verify(&self, account_id: Uuid, expires: i64, signature: &str) -> AppResult<()> {
        if expires < Utc::now().timestamp() {
            return Err(AppError::Verification(
                "Verification link has expired".to_string(),
            ));
        }
        let expected = self.signature_for(account_id, expires)?;
        if signature != expected {
            debug!(%account_id, "verification link signature mismatch");
            return Err(AppError::Verification(
                "Invalid verification link".to_string(),
            ));
        }
        Ok(())
    }
}
