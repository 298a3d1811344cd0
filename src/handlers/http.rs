//! Shared application state and the health probe.

use axum::{http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

use crate::auth::JwtSecret;
use crate::db::DbPool;
use crate::notify::NotificationSender;
use crate::repositories::RevocationStore;
use crate::verification::LinkSigner;

/// Shared application state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub jwt: JwtSecret,
    pub links: LinkSigner,
    pub revocations: RevocationStore,
    pub mailer: Arc<dyn NotificationSender>,
    /// Public base URL, embedded in verification links.
    pub app_url: String,
}

impl AppState {
    pub fn db(&self) -> &DbPool {
        &self.db
    }
    pub fn jwt(&self) -> &JwtSecret {
        &self.jwt
    }
    pub fn links(&self) -> &LinkSigner {
        &self.links
    }
    pub fn revocations(&self) -> &RevocationStore {
        &self.revocations
    }
    pub fn mailer(&self) -> &dyn NotificationSender {
        self.mailer.as_ref()
    }
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "credo" })),
    )
}
