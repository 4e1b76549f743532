//! Domain events pushed to connected clients.
//!
//! Each event knows the wire name it is published under; the payload is
//! serialized with camelCase keys to match the web client.

pub mod progress;

pub use progress::ProgressUpdated;

/// An event that can be published on a user's private channel.
pub trait ClientEvent: serde::Serialize {
    /// Wire name of the event (`progress:updated`).
    fn event_name(&self) -> &'static str;
}
