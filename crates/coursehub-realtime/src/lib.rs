//! # coursehub-realtime
//!
//! Per-user realtime push for CourseHub. Each authenticated WebSocket is
//! registered under its user; events published for that user fan out to
//! every open connection as JSON frames.

pub mod connection;
pub mod message;
pub mod server;

pub use connection::manager::ConnectionManager;
pub use message::types::{InboundMessage, OutboundMessage};
pub use server::RealtimeEngine;
