//! Top-level realtime engine.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info};

use coursehub_core::config::RealtimeConfig;
use coursehub_core::result::AppResult;
use coursehub_core::traits::EventPublisher;
use coursehub_core::types::id::UserId;

use crate::connection::manager::{ConnectionManager, user_channel};
use crate::message::types::OutboundMessage;

/// Realtime engine shared by the socket handler and the services.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    config: RealtimeConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.connections.connection_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates an engine with no connections.
    pub fn new(config: RealtimeConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        info!(
            max_connections_per_user = config.max_connections_per_user,
            "Realtime engine initialized"
        );
        Self {
            connections: Arc::new(ConnectionManager::new(config.clone())),
            config,
            shutdown_tx,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Receiver that fires once when the engine shuts down.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signals socket tasks to stop and drops every connection.
    pub fn shutdown(&self) {
        info!("Shutting down realtime engine");
        let _ = self.shutdown_tx.send(());
        self.connections.close_all();
    }
}

#[async_trait]
impl EventPublisher for RealtimeEngine {
    async fn publish(
        &self,
        user_id: UserId,
        event: &str,
        payload: serde_json::Value,
    ) -> AppResult<()> {
        let frame = OutboundMessage::event(event, payload);
        let delivered = self.connections.send_to_user(user_id, &frame);
        debug!(
            channel = %user_channel(user_id),
            event,
            delivered,
            "Published realtime event"
        );
        Ok(())
    }
}
