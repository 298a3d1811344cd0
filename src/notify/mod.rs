//! Notification sender: dispatches verification emails.
//!
//! Delivery itself is out of scope; the production implementation records the
//! dispatch via tracing. The trait seam exists so deployments can plug in a
//! real mail transport and so tests can observe sends.

use crate::error::AppResult;
use crate::models::Account;
use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Dispatch one verification email carrying the signed link.
    async fn send_verification_email(&self, account: &Account, link_url: &str) -> AppResult<()>;
}

/// Logs the dispatch instead of talking to a mail server.
pub struct TracingMailer;

#[async_trait]
impl NotificationSender for TracingMailer {
    async fn send_verification_email(&self, account: &Account, link_url: &str) -> AppResult<()> {
        info!(email = %account.email, %link_url, "verification email dispatched");
        Ok(())
    }
}
