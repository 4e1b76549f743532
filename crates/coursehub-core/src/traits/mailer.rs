//! Transactional mail trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// A rendered transactional email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Template identifier (`certificate`, `enrollment`).
    pub template: String,
    /// Plain-text body.
    pub body: String,
}

/// Delivers transactional email.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send one message.
    async fn send(&self, message: EmailMessage) -> AppResult<()>;
}
