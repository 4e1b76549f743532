//! Course structure: modules and lessons.

pub mod model;

pub use model::{CourseModule, Lesson, LessonContext};
