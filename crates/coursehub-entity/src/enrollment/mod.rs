//! Enrollment domain entities.

pub mod model;
pub mod status;

pub use model::{Enrollment, EnrollmentCounts, EnrollmentSummary};
pub use status::EnrollmentStatus;
