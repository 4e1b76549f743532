//! Wire messages exchanged over the socket.

pub mod types;

pub use types::{InboundMessage, OutboundMessage};
