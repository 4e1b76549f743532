//! Axum middleware stack.

pub mod compression;
pub mod cors;
pub mod errors;
pub mod logging;
