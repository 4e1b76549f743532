//! Activity type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a learner did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    /// A lesson was marked completed.
    LessonComplete,
    /// Every published lesson of a course was completed.
    CourseComplete,
    /// The user enrolled in a course.
    CourseEnrolled,
    /// The user dropped a course.
    CourseDropped,
}

impl ActivityType {
    /// Return the type as its stored string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LessonComplete => "LESSON_COMPLETE",
            Self::CourseComplete => "COURSE_COMPLETE",
            Self::CourseEnrolled => "COURSE_ENROLLED",
            Self::CourseDropped => "COURSE_DROPPED",
        }
    }

    /// Types shown in the enrollment dashboard feed.
    pub fn dashboard_feed() -> &'static [ActivityType] {
        &[
            Self::CourseEnrolled,
            Self::CourseComplete,
            Self::LessonComplete,
        ]
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
