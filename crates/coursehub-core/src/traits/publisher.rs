//! Realtime publisher trait.

use async_trait::async_trait;

use crate::events::ClientEvent;
use crate::result::AppResult;
use crate::types::id::UserId;

/// Pushes events onto a user's private realtime channel.
///
/// Publishing to a user with no open connection is not an error.
#[async_trait]
pub trait EventPublisher: Send + Sync + 'static {
    /// Publish `payload` under `event` to `user_id`.
    async fn publish(
        &self,
        user_id: UserId,
        event: &str,
        payload: serde_json::Value,
    ) -> AppResult<()>;
}

/// Publish a typed event.
pub async fn publish_event<E: ClientEvent + Sync>(
    publisher: &dyn EventPublisher,
    user_id: UserId,
    event: &E,
) -> AppResult<()> {
    let payload = serde_json::to_value(event)?;
    publisher
        .publish(user_id, event.event_name(), payload)
        .await
}
