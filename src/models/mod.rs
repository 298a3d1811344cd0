//! API-facing data shapes.

mod account;

pub use account::Account;
