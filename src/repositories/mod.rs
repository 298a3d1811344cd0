//! Externally-owned stores that are not the relational database.

mod redis_repo;

pub use redis_repo::RevocationStore;
