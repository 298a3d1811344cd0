//! Auth HTTP handlers: register, login, logout, refresh.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::auth::service::{
    validate_login, validate_registration, AuthAppService, DUMMY_PASSWORD_HASH,
};
use crate::db::{account_create, account_find_by_email, account_get_by_id};
use crate::error::{AppError, FieldErrors};
use crate::handlers::http::AppState;
use crate::middleware::{AuthSession, PresentedToken};
use crate::models::Account;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn duplicate_email_errors() -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(
        "email".to_string(),
        vec!["Email is already registered".to_string()],
    );
    errors
}

fn authorization(token: &str) -> Value {
    json!({ "token": token, "type": "Bearer" })
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    let mut errors = validate_registration(
        &body.name,
        &body.email,
        &body.password,
        &body.password_confirmation,
    );
    let email = body.email.trim().to_lowercase();

    if !errors.contains_key("email")
        && account_find_by_email(state.db(), &email).await?.is_some()
    {
        errors.extend(duplicate_email_errors());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let password_hash = AuthAppService::hash_password(&body.password)?;
    // The unique index still arbitrates: a racing registration that slipped
    // past the lookup surfaces here as a conflict, not a duplicate row.
    let row = account_create(state.db(), body.name.trim(), &email, &password_hash)
        .await?
        .ok_or_else(|| AppError::Validation(duplicate_email_errors()))?;
    let account = Account::from(row);

    let link = state.links().sign(account.id)?;
    let message = match state
        .mailer()
        .send_verification_email(&account, &link.url(&state.app_url))
        .await
    {
        Ok(()) => "Registration successful. Check your email to verify your address",
        Err(e) => {
            // Delivery failure must not roll back the registration.
            warn!(email = %account.email, error = %e, "verification email dispatch failed");
            "Registration successful, but the verification email could not be sent"
        }
    };

    Ok(Json(json!({
        "status": true,
        "message": message,
        "user": account,
    })))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let errors = validate_login(&body.email, &body.password);
    if !errors.is_empty() {
        return Err(AppError::BadRequest(errors));
    }

    let email = body.email.trim().to_lowercase();
    let row = account_find_by_email(state.db(), &email).await?;
    let ok = match &row {
        Some(account) => AuthAppService::verify_password(&body.password, &account.password_hash)?,
        None => {
            // Burn a verification anyway so unknown-email and wrong-password
            // take comparable time.
            let _ = AuthAppService::verify_password(&body.password, DUMMY_PASSWORD_HASH);
            false
        }
    };
    let row = match (row, ok) {
        (Some(account), true) => account,
        _ => return Err(AppError::Credentials),
    };

    let issued = state.jwt().issue(row.id)?;

    Ok(Json(json!({
        "status": true,
        "message": "Login successful",
        "user": Account::from(row),
        "authorization": authorization(&issued.token),
    })))
}

/// GET /logout — revoke the presented token. Idempotent: revoking a token
/// that is already revoked or expired still reports success.
pub async fn logout(
    State(state): State<AppState>,
    PresentedToken(claims): PresentedToken,
) -> Result<Json<Value>, AppError> {
    let _ = state
        .revocations()
        .claim(claims.jti, claims.remaining_ttl())
        .await?;

    Ok(Json(json!({
        "status": true,
        "message": "Logout successful",
    })))
}

/// GET /refresh — revoke the presented token and mint a replacement. The
/// `SET NX` claim decides a race against logout or a concurrent refresh:
/// only the winner gets the new token.
pub async fn refresh(
    State(state): State<AppState>,
    AuthSession(claims): AuthSession,
) -> Result<Json<Value>, AppError> {
    let claimed = state
        .revocations()
        .claim(claims.jti, claims.remaining_ttl())
        .await?;
    if !claimed {
        return Err(AppError::Auth("Token has been revoked".to_string()));
    }

    let row = account_get_by_id(state.db(), claims.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;
    let issued = state.jwt().issue(row.id)?;

    Ok(Json(json!({
        "status": true,
        "message": "Token refreshed",
        "user": Account::from(row),
        "authorization": authorization(&issued.token),
    })))
}
