//! Lesson progress workflow and progress read views.

pub mod service;
pub mod streak;
pub mod views;

pub use service::ProgressService;
pub use streak::learning_streak;
pub use views::{CourseProgress, LessonProgressItem, ModuleProgress, OverallProgress};
