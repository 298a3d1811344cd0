//! Account repository. Email uniqueness is enforced by the unique index,
//! so concurrent inserts of the same address resolve at the storage layer.

use crate::error::AppResult;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;

#[derive(Debug, FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AccountRow {
    pub fn is_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }
}

/// Insert a new account. Returns `None` when the email is already taken —
/// `ON CONFLICT DO NOTHING` lets the unique index arbitrate races instead of
/// a check-then-insert window.
pub async fn account_create(
    pool: &DbPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> AppResult<Option<AccountRow>> {
    let row = sqlx::query_as::<_, AccountRow>(
        r#"
        INSERT INTO accounts (name, email, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO NOTHING
        RETURNING id, name, email, password_hash, email_verified_at, created_at
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn account_find_by_email(pool: &DbPool, email: &str) -> AppResult<Option<AccountRow>> {
    let row = sqlx::query_as::<_, AccountRow>(
        "SELECT id, name, email, password_hash, email_verified_at, created_at FROM accounts WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn account_get_by_id(pool: &DbPool, id: Uuid) -> AppResult<Option<AccountRow>> {
    let row = sqlx::query_as::<_, AccountRow>(
        "SELECT id, name, email, password_hash, email_verified_at, created_at FROM accounts WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Stamp `email_verified_at`. The `IS NULL` guard keeps re-verification
/// idempotent: an already-set timestamp is never overwritten.
pub async fn account_mark_verified(pool: &DbPool, id: Uuid) -> AppResult<()> {
    sqlx::query(
        "UPDATE accounts SET email_verified_at = NOW() WHERE id = $1 AND email_verified_at IS NULL",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}
