//! Password hashing and explicit field-level validation.

use crate::error::{AppError, AppResult, FieldErrors};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::ValidateEmail;

const MIN_PASSWORD_LEN: usize = 8;

/// Syntactically valid argon2 digest matching no real password. Login runs a
/// verification against this when the email is unknown, so both failure modes
/// do comparable work.
pub const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHRzYWx0c2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

pub struct AuthAppService;

impl AuthAppService {
    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("hash: {}", e)))?
            .to_string();
        Ok(hash)
    }

    pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("parse hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

fn push(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

/// Registration rules: name non-empty, email well-formed, password at least
/// 8 chars and equal to its confirmation. Returns an empty map on success.
/// Email uniqueness is checked separately against the store.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    password_confirmation: &str,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if name.trim().is_empty() {
        push(&mut errors, "name", "Name must not be empty");
    }

    if email.trim().is_empty() {
        push(&mut errors, "email", "Email is required");
    } else if !email.validate_email() {
        push(&mut errors, "email", "Email format is invalid");
    }

    if password.is_empty() {
        push(&mut errors, "password", "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        push(
            &mut errors,
            "password",
            "Password must be at least 8 characters",
        );
    }
    if password != password_confirmation {
        push(
            &mut errors,
            "password",
            "Password confirmation does not match",
        );
    }

    errors
}

/// Login rules: both fields present, email well-formed. Whether the
/// credentials actually match is decided later, with one generic error.
pub fn validate_login(email: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if email.trim().is_empty() {
        push(&mut errors, "email", "Email is required");
    } else if !email.validate_email() {
        push(&mut errors, "email", "Email format is invalid");
    }

    if password.is_empty() {
        push(&mut errors, "password", "Password is required");
    }

    errors
}
