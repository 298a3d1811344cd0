//! Client-facing account shape. The password digest never crosses this
//! boundary: `Account` simply has no field for it.

use crate::db::AccountRow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            email_verified_at: row.email_verified_at,
            created_at: row.created_at,
        }
    }
}
