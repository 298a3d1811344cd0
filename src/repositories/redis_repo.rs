//! Redis-backed token revocation record.
//!
//! A revoked token id (`jti`) is stored with a TTL equal to the token's
//! remaining lifetime; once the token would have expired anyway the record
//! is garbage-collected by Redis.

use crate::error::AppError;
use redis::{AsyncCommands, ExistenceCheck, SetExpiry, SetOptions};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

const REVOKED_PREFIX: &str = "credo:revoked:";

fn revoked_key(jti: Uuid) -> String {
    format!("{}{}", REVOKED_PREFIX, jti)
}

#[derive(Clone)]
pub struct RevocationStore {
    client: Arc<redis::Client>,
}

impl RevocationStore {
    pub fn new(redis_url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, AppError> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }

    /// Revoke `jti`, claiming it with `SET NX`. Returns `true` if this call
    /// was the one that revoked it, `false` if it was already revoked. A
    /// refresh and a logout racing on the same token each call this; exactly
    /// one sees `true`.
    pub async fn claim(&self, jti: Uuid, ttl_secs: i64) -> Result<bool, AppError> {
        let mut conn = self.connection().await?;
        let opts = SetOptions::default()
            .conditional_set(ExistenceCheck::NX)
            .with_expiration(SetExpiry::EX(ttl_secs.max(1) as usize));
        let set: Option<String> = conn.set_options(revoked_key(jti), "1", opts).await?;
        let claimed = set.is_some();
        debug!(%jti, claimed, "revocation claim");
        Ok(claimed)
    }

    /// Whether `jti` has been revoked before its natural expiry.
    pub async fn is_revoked(&self, jti: Uuid) -> Result<bool, AppError> {
        let mut conn = self.connection().await?;
        let revoked: bool = conn.exists(revoked_key(jti)).await?;
        Ok(revoked)
    }
}
