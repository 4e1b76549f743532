//! # coursehub-core
//!
//! Core crate for CourseHub. Contains configuration schemas, typed
//! identifiers, domain events, pagination and response envelopes,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other CourseHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
