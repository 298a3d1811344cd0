//! Request-scoped auth context. No ambient authentication state: handlers
//! receive the session resolved from the bearer token as an extractor.

pub mod auth;

pub use auth::{AuthSession, PresentedToken};
