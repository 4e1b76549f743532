//! # coursehub-service
//!
//! Business logic for CourseHub. Services are written against the store
//! traits from `coursehub-database` and the side-channel traits from
//! `coursehub-core`, all injected at construction time.

pub mod context;
mod effects;
pub mod enrollment;
pub mod mail;
pub mod progress;

pub use context::RequestContext;
pub use enrollment::EnrollmentService;
pub use mail::LogMailer;
pub use progress::ProgressService;

#[cfg(test)]
pub(crate) mod testing;
