//! Append-only activity log entities.

pub mod kind;
pub mod model;

pub use kind::ActivityType;
pub use model::{Activity, NewActivity};
