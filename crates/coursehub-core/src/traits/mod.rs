//! Seams to outbound side channels, implemented by other crates.

pub mod mailer;
pub mod publisher;

pub use mailer::{EmailMessage, Mailer};
pub use publisher::EventPublisher;
