//! Email verification handlers: verify, notice, resend.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use crate::db::{account_get_by_id, account_mark_verified};
use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::middleware::AuthSession;
use crate::models::Account;

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    pub expires: i64,
    pub signature: String,
}

/// GET /email/verify/:id — consume a signed link. Idempotent for an already
/// verified account; the original timestamp is never touched.
pub async fn verify(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<VerifyParams>,
) -> Result<Response, AppError> {
    state.links().verify(id, params.expires, &params.signature)?;

    // The link may outlive the account it points at.
    let row = account_get_by_id(state.db(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

    if !row.is_verified() {
        account_mark_verified(state.db(), row.id).await?;
    }

    Ok(Redirect::to("/").into_response())
}

/// GET /email/verify — fallback for authenticated but unverified callers.
pub async fn notice(_session: AuthSession) -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "status": false,
            "message": "Email address has not been verified",
        })),
    )
}

/// GET /email/resend — dispatch a fresh verification link, unless the
/// account is already verified.
pub async fn resend(
    State(state): State<AppState>,
    AuthSession(claims): AuthSession,
) -> Result<Json<Value>, AppError> {
    let row = account_get_by_id(state.db(), claims.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

    if row.is_verified() {
        return Ok(Json(json!({
            "status": true,
            "message": "Email is already verified",
        })));
    }

    let account = Account::from(row);
    let link = state.links().sign(account.id)?;
    let message = match state
        .mailer()
        .send_verification_email(&account, &link.url(&state.app_url))
        .await
    {
        Ok(()) => "Verification link has been sent to your email",
        Err(e) => {
            warn!(email = %account.email, error = %e, "verification email dispatch failed");
            "Verification email could not be sent, try again later"
        }
    };

    Ok(Json(json!({
        "status": true,
        "message": message,
    })))
}
