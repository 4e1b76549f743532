//! Lesson progress entities.

pub mod calc;
pub mod model;

pub use calc::completion_percentage;
pub use model::{Progress, ProgressPatch, RecentCompletion};
