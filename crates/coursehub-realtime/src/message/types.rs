//! Inbound and outbound WebSocket message definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Frames sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Keep-alive probe, answered with a `pong` event.
    Ping,
}

impl InboundMessage {
    /// Parse a text frame. Unknown or malformed frames yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

/// Frames pushed to the client: `{ "event", "data", "timestamp" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Event name, e.g. `progress:updated`.
    pub event: String,
    /// Event payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Server time the frame was built.
    pub timestamp: DateTime<Utc>,
}

impl OutboundMessage {
    /// Build an event frame.
    pub fn event(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data: Some(data),
            timestamp: Utc::now(),
        }
    }

    /// Reply to a client ping.
    pub fn pong() -> Self {
        Self {
            event: "pong".to_string(),
            data: None,
            timestamp: Utc::now(),
        }
    }

    /// Serialize to a JSON text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
