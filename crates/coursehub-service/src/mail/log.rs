//! Mailer that records outgoing mail in the log instead of relaying it.

use async_trait::async_trait;
use tracing::{debug, info};

use coursehub_core::config::EmailConfig;
use coursehub_core::result::AppResult;
use coursehub_core::traits::{EmailMessage, Mailer};

/// Writes each message to the log. SMTP delivery is handled outside this
/// service.
#[derive(Debug, Clone)]
pub struct LogMailer {
    config: EmailConfig,
}

impl LogMailer {
    /// Creates a mailer from configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        if !self.config.enabled {
            debug!(to = %message.to, template = %message.template, "Email disabled, skipping");
            return Ok(());
        }
        info!(
            from = %self.config.from_header(),
            to = %message.to,
            subject = %message.subject,
            template = %message.template,
            "Email sent"
        );
        Ok(())
    }
}
