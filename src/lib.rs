//! Credential service built with Rust.
//!
//! Account registration and login with argon2-hashed passwords, JWT bearer
//! sessions with Redis-backed revocation, and HMAC-signed email verification
//! links.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod notify;
pub mod repositories;
pub mod verification;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use repositories::RevocationStore;
pub use verification::LinkSigner;

use axum::routing::{get, post};
use handlers::http;
use tower_http::trace::TraceLayer;

/// Build the API router. Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/refresh", get(auth::refresh))
        .route("/email/verify/:id", get(verification::verify))
        .route("/email/verify", get(verification::notice))
        .route("/email/resend", get(verification::resend))
        .route("/health", get(http::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
