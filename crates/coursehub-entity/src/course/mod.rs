//! Course domain entities.

pub mod model;
pub mod status;

pub use model::{Course, CoursePrerequisite};
pub use status::CourseStatus;
