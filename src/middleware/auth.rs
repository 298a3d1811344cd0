//! Bearer-token extractor: validates the JWT and checks the revocation record.

use axum::http::header::AUTHORIZATION;

use crate::auth::SessionClaims;
use crate::error::AppError;
use crate::handlers::http::AppState;

const BEARER_PREFIX: &str = "Bearer ";

fn bearer_token(parts: &axum::http::request::Parts) -> Result<&str, AppError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| AppError::Auth("Missing or invalid Authorization header".to_string()))
}

/// Extractor: the authenticated session behind the presented bearer token.
/// Carries the claims so handlers can revoke the token by its id.
#[derive(Clone, Copy, Debug)]
pub struct AuthSession(pub SessionClaims);

#[axum::async_trait]
impl axum::extract::FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.jwt().validate(token)?;
        if state.revocations().is_revoked(claims.jti).await? {
            return Err(AppError::Auth("Token has been revoked".to_string()));
        }
        Ok(AuthSession(claims))
    }
}

/// Extractor: the bearer token as presented, decoded but neither checked
/// against the revocation record nor required to be unexpired. Logout uses
/// this so revoking twice, or revoking an expired token, still succeeds.
#[derive(Clone, Copy, Debug)]
pub struct PresentedToken(pub SessionClaims);

#[axum::async_trait]
impl axum::extract::FromRequestParts<AppState> for PresentedToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.jwt().decode_lenient(token)?;
        Ok(PresentedToken(claims))
    }
}
