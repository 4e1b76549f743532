//! Notification type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a notification, used by the client to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    /// Enrollment confirmations.
    Enrollment,
    /// Badges and course completion.
    Achievement,
    /// Changes to an enrolled course.
    CourseUpdate,
    /// Platform announcements.
    System,
}

impl NotificationType {
    /// Return the type as its stored string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enrollment => "ENROLLMENT",
            Self::Achievement => "ACHIEVEMENT",
            Self::CourseUpdate => "COURSE_UPDATE",
            Self::System => "SYSTEM",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
