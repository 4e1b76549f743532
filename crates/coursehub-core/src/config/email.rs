//! Outbound email configuration.

use serde::{Deserialize, Serialize};

/// Sender settings for transactional email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Whether emails are dispatched at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Envelope sender address.
    #[serde(default = "default_from_address")]
    pub from_address: String,
    /// Display name of the sender.
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl EmailConfig {
    /// Formatted `From` header value.
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_address)
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            from_address: default_from_address(),
            from_name: default_from_name(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_from_address() -> String {
    "noreply@coursehub.local".to_string()
}

fn default_from_name() -> String {
    "CourseHub".to_string()
}
