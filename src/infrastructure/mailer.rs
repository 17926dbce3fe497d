use async_trait::async_trait;
use tracing::info;

use crate::error::AppResult;

/// Outbound mail. Verification codes and reset tokens go through here.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// Writes every message to the log instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        info!(to, subject, "MAIL: {}", body);
        Ok(())
    }
}
