//! Connection lifecycle: register, unregister, inbound handling, fan-out.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use coursehub_core::config::RealtimeConfig;
use coursehub_core::types::id::UserId;

use crate::message::types::{InboundMessage, OutboundMessage};

use super::handle::{ConnectionHandle, ConnectionId};
use super::pool::ConnectionPool;

/// Name of a user's private channel, used in logs.
pub fn user_channel(user_id: UserId) -> String {
    format!("user:{user_id}")
}

/// Manages all open WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    pool: ConnectionPool,
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a manager with an empty pool.
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            pool: ConnectionPool::new(),
            config,
        }
    }

    /// Registers an authenticated connection for `user_id`.
    ///
    /// When the user is already at the connection cap the oldest connection
    /// is closed to make room.
    pub fn register(
        &self,
        user_id: UserId,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(user_id, tx));

        let existing = self.pool.user_connections(&user_id);
        if existing.len() >= self.config.max_connections_per_user.max(1) {
            warn!(
                user_id = %user_id,
                count = existing.len(),
                max = self.config.max_connections_per_user,
                "User at max connections, closing oldest"
            );
            if let Some(oldest) = existing.first() {
                oldest.close();
                self.pool.remove(&oldest.id);
            }
        }

        self.pool.add(handle.clone());

        info!(
            conn_id = %handle.id,
            user_id = %user_id,
            channel = %user_channel(user_id),
            "WebSocket connection registered"
        );

        (handle, rx)
    }

    /// Unregisters a connection.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_dead();
            info!(
                conn_id = %conn_id,
                user_id = %handle.user_id,
                "WebSocket connection unregistered"
            );
        }
    }

    /// Handles one text frame from a client, returning the reply if any.
    pub fn handle_inbound(&self, handle: &ConnectionHandle, raw: &str) -> Option<OutboundMessage> {
        match InboundMessage::parse(raw) {
            Some(InboundMessage::Ping) => Some(OutboundMessage::pong()),
            None => {
                debug!(conn_id = %handle.id, "Ignoring unrecognized client frame");
                None
            }
        }
    }

    /// Pushes `msg` to every live connection of `user_id`.
    ///
    /// Returns the number of connections the frame was queued on.
    pub fn send_to_user(&self, user_id: UserId, msg: &OutboundMessage) -> usize {
        let mut delivered = 0;
        for conn in self.pool.user_connections(&user_id) {
            if conn.send(msg.clone()) {
                delivered += 1;
            } else if !conn.is_alive() {
                self.pool.remove(&conn.id);
            }
        }
        delivered
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Number of open connections for one user.
    pub fn user_connection_count(&self, user_id: UserId) -> usize {
        self.pool.user_connections(&user_id).len()
    }

    /// Closes every connection and empties the pool.
    pub fn close_all(&self) {
        let closed = self.pool.drain();
        for conn in &closed {
            conn.close();
        }
        info!(count = closed.len(), "Closed all WebSocket connections");
    }
}
