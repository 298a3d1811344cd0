//! Integration tests: health, register/login, token lifecycle, verification.
//!
//! Run with `cargo test`. Needs live backing stores:
//! - `TEST_DATABASE_URL` (Postgres, run migrations first)
//! - `TEST_REDIS_URL` (defaults to redis://127.0.0.1:6379 if unset)
//! Tests are skipped when `TEST_DATABASE_URL` is unset.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use credo::auth::JwtSecret;
use credo::error::AppResult;
use credo::models::Account;
use credo::notify::NotificationSender;
use credo::repositories::RevocationStore;
use credo::verification::LinkSigner;
use credo::{create_app, db, AppState};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

const APP_URL: &str = "http://test.local";

/// Captures dispatched verification links instead of sending anything.
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingMailer {
    async fn send_verification_email(&self, account: &Account, link_url: &str) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((account.email.clone(), link_url.to_string()));
        Ok(())
    }
}

async fn test_state(
    mailer: Arc<RecordingMailer>,
) -> Result<Option<AppState>, Box<dyn std::error::Error>> {
    let database_url = match std::env::var("TEST_DATABASE_URL") {
        Ok(u) => u,
        Err(_) => {
            eprintln!("Skip integration test: set TEST_DATABASE_URL and TEST_REDIS_URL");
            return Ok(None);
        }
    };
    let redis_url =
        std::env::var("TEST_REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

    let db_pool = db::create_pool(&database_url, 5).await?;
    let revocations = RevocationStore::new(&redis_url)?;
    Ok(Some(AppState {
        db: db_pool,
        jwt: JwtSecret::new("test-jwt-secret-min-32-chars!!".to_string(), 60),
        links: LinkSigner::new("test-link-secret".to_string(), 24),
        revocations,
        mailer,
        app_url: APP_URL.to_string(),
    }))
}

fn unique_email() -> String {
    format!(
        "test-{}@example.com",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    )
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn bearer_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(res: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &axum::Router, email: &str) -> axum::response::Response {
    let body = serde_json::json!({
        "name": "Ana",
        "email": email,
        "password": "pw123456",
        "password_confirmation": "pw123456"
    });
    app.clone()
        .oneshot(json_request("POST", "/register", body))
        .await
        .unwrap()
}

async fn login_token(app: &axum::Router, email: &str, password: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": password });
    let res = app
        .clone()
        .oneshot(json_request("POST", "/login", body))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK, "login should succeed");
    let json = body_json(res).await;
    json["authorization"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_returns_ok() {
    let state = match test_state(Arc::new(RecordingMailer::default())).await {
        Ok(Some(s)) => s,
        _ => return,
    };
    let app = create_app(state);
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("ok"));
}

#[tokio::test]
async fn register_sends_one_notification_and_login_issues_token() {
    let mailer = Arc::new(RecordingMailer::default());
    let state = match test_state(mailer.clone()).await {
        Ok(Some(s)) => s,
        _ => return,
    };
    let app = create_app(state);
    let email = unique_email();

    let res = register(&app, &email).await;
    assert_eq!(res.status(), StatusCode::OK, "register should succeed");
    let json = body_json(res).await;
    assert_eq!(json["status"], true);
    assert!(json["user"]["email_verified_at"].is_null());
    assert!(json["user"].get("password_hash").is_none());
    assert_eq!(mailer.sent().len(), 1, "exactly one verification email");

    let token = login_token(&app, &email, "pw123456").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let state = match test_state(Arc::new(RecordingMailer::default())).await {
        Ok(Some(s)) => s,
        _ => return,
    };
    let app = create_app(state);
    let email = unique_email();

    let res = register(&app, &email).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = register(&app, &email).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(res).await;
    assert_eq!(json["status"], false);
    assert_eq!(json["message"]["email"][0], "Email is already registered");
}

#[tokio::test]
async fn invalid_registration_returns_field_errors() {
    let state = match test_state(Arc::new(RecordingMailer::default())).await {
        Ok(Some(s)) => s,
        _ => return,
    };
    let app = create_app(state);

    let body = serde_json::json!({
        "name": "",
        "email": "not-an-email",
        "password": "short",
        "password_confirmation": "different"
    });
    let res = app
        .oneshot(json_request("POST", "/register", body))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(res).await;
    assert!(json["message"]["name"].is_array());
    assert!(json["message"]["email"].is_array());
    assert!(json["message"]["password"].is_array());
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let state = match test_state(Arc::new(RecordingMailer::default())).await {
        Ok(Some(s)) => s,
        _ => return,
    };
    let app = create_app(state);
    let email = unique_email();
    assert_eq!(register(&app, &email).await.status(), StatusCode::OK);

    let wrong_password = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            serde_json::json!({ "email": email, "password": "wrongwrong" }),
        ))
        .await
        .unwrap();
    let unknown_email = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            serde_json::json!({ "email": unique_email(), "password": "whatever1" }),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
    assert_eq!(unknown_email.status(), StatusCode::BAD_REQUEST);
    let a = body_json(wrong_password).await;
    let b = body_json(unknown_email).await;
    assert_eq!(a, b, "both failure modes must look identical");
    assert_eq!(a["message"], "Invalid email or password");
}

#[tokio::test]
async fn logout_revokes_token_idempotently() {
    let state = match test_state(Arc::new(RecordingMailer::default())).await {
        Ok(Some(s)) => s,
        _ => return,
    };
    let app = create_app(state);
    let email = unique_email();
    assert_eq!(register(&app, &email).await.status(), StatusCode::OK);
    let token = login_token(&app, &email, "pw123456").await;

    let res = app
        .clone()
        .oneshot(bearer_request("/logout", &token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Logging out again with the same token is still a success.
    let res = app
        .clone()
        .oneshot(bearer_request("/logout", &token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Revoked token no longer authenticates.
    let res = app
        .clone()
        .oneshot(bearer_request("/refresh", &token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rotates_the_token() {
    let state = match test_state(Arc::new(RecordingMailer::default())).await {
        Ok(Some(s)) => s,
        _ => return,
    };
    let app = create_app(state);
    let email = unique_email();
    assert_eq!(register(&app, &email).await.status(), StatusCode::OK);
    let old_token = login_token(&app, &email, "pw123456").await;

    let res = app
        .clone()
        .oneshot(bearer_request("/refresh", &old_token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["authorization"]["type"], "Bearer");
    let new_token = json["authorization"]["token"].as_str().unwrap().to_string();
    assert_ne!(new_token, old_token);

    // Old token is dead, new one works.
    let res = app
        .clone()
        .oneshot(bearer_request("/refresh", &old_token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let res = app
        .clone()
        .oneshot(bearer_request("/logout", &new_token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

async fn verified_at(pool: &sqlx::PgPool, email: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    sqlx::query_scalar("SELECT email_verified_at FROM accounts WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn verification_link_flow() {
    let mailer = Arc::new(RecordingMailer::default());
    let state = match test_state(mailer.clone()).await {
        Ok(Some(s)) => s,
        _ => return,
    };
    let pool = state.db.clone();
    let app = create_app(state);
    let email = unique_email();
    assert_eq!(register(&app, &email).await.status(), StatusCode::OK);

    let (_, link_url) = mailer.sent().pop().unwrap();
    let path = link_url.strip_prefix(APP_URL).unwrap().to_string();

    // Tampered signature fails before anything else.
    let tampered = format!("{}x", path);
    let res = app
        .clone()
        .oneshot(Request::builder().uri(&tampered).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .clone()
        .oneshot(Request::builder().uri(&path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(res.status().is_redirection(), "valid link redirects home");
    let first_verified_at = verified_at(&pool, &email).await;
    assert!(first_verified_at.is_some());

    // Second consumption is an idempotent success and leaves the
    // verification timestamp untouched.
    let res = app
        .clone()
        .oneshot(Request::builder().uri(&path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(res.status().is_redirection());
    assert_eq!(verified_at(&pool, &email).await, first_verified_at);

    // Once verified, resend reports there is nothing to do.
    let token = login_token(&app, &email, "pw123456").await;
    let res = app
        .clone()
        .oneshot(bearer_request("/email/resend", &token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["message"], "Email is already verified");
    assert_eq!(mailer.sent().len(), 1, "no second email after verification");
}

#[tokio::test]
async fn verify_of_deleted_account_is_not_found() {
    let mailer = Arc::new(RecordingMailer::default());
    let state = match test_state(mailer.clone()).await {
        Ok(Some(s)) => s,
        _ => return,
    };
    let pool = state.db.clone();
    let app = create_app(state);
    let email = unique_email();
    assert_eq!(register(&app, &email).await.status(), StatusCode::OK);

    let (_, link_url) = mailer.sent().pop().unwrap();
    let path = link_url.strip_prefix(APP_URL).unwrap().to_string();

    // The link can outlive the account it points at.
    sqlx::query("DELETE FROM accounts WHERE email = $1")
        .bind(&email)
        .execute(&pool)
        .await
        .unwrap();

    let res = app
        .oneshot(Request::builder().uri(&path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let json = body_json(res).await;
    assert_eq!(json["status"], false);
}

#[tokio::test]
async fn notice_and_resend_for_unverified_account() {
    let mailer = Arc::new(RecordingMailer::default());
    let state = match test_state(mailer.clone()).await {
        Ok(Some(s)) => s,
        _ => return,
    };
    let app = create_app(state);
    let email = unique_email();
    assert_eq!(register(&app, &email).await.status(), StatusCode::OK);
    let token = login_token(&app, &email, "pw123456").await;

    let res = app
        .clone()
        .oneshot(bearer_request("/email/verify", &token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert_eq!(json["status"], false);

    let res = app
        .clone()
        .oneshot(bearer_request("/email/resend", &token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(mailer.sent().len(), 2, "resend dispatches a fresh link");

    // Unauthenticated notice is rejected outright.
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/email/verify")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
