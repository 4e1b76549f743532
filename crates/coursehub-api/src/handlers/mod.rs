//! Route handlers organized by domain.

pub mod enrollment;
pub mod health;
pub mod progress;
pub mod ws;
