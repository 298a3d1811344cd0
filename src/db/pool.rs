//! PostgreSQL connection pool for the account store.
//!
//! Login and register both hit the pool on every request, so it keeps a
//! few warm connections and fails fast when saturated instead of queueing
//! callers behind a long acquire.

use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

pub type DbPool = sqlx::PgPool;

const MIN_WARM_CONNECTIONS: u32 = 2;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(MIN_WARM_CONNECTIONS.min(max_connections))
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
}
