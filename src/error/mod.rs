//! Application error types for robust error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Registration input rejected (422, field map in the envelope).
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Malformed login input (400, field map in the envelope).
    #[error("Bad request")]
    BadRequest(FieldErrors),

    /// Unknown email or wrong password. One message for both, so a caller
    /// cannot probe which emails are registered.
    #[error("Invalid email or password")]
    Credentials,

    /// Missing, malformed, expired, or revoked bearer token.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Invalid or expired verification link.
    #[error("Verification failed: {0}")]
    Verification(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!(errors),
            ),
            AppError::BadRequest(errors) => (StatusCode::BAD_REQUEST, json!(errors)),
            AppError::Credentials => (
                StatusCode::BAD_REQUEST,
                json!("Invalid email or password"),
            ),
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, json!(msg)),
            AppError::Verification(msg) => (StatusCode::BAD_REQUEST, json!(msg)),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!(msg)),
            AppError::Db(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!(format!("Database error: {}", e)),
            ),
            AppError::Redis(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!(format!("Redis error: {}", e)),
            ),
            AppError::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!(format!("Internal error: {}", e)),
            ),
        };

        let body = Json(json!({ "status": false, "message": message }));
        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
