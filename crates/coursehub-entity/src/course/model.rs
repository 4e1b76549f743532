//! Course entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::CourseStatus;

/// A course offered on the platform.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Unique course identifier.
    pub id: Uuid,
    /// Course title.
    pub title: String,
    /// Long description.
    pub description: String,
    /// Thumbnail image URL.
    pub thumbnail: Option<String>,
    /// Publication status.
    pub status: CourseStatus,
    /// When the course was created.
    pub created_at: DateTime<Utc>,
    /// When the course was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Whether learners may enroll.
    pub fn is_published(&self) -> bool {
        self.status == CourseStatus::Published
    }
}

/// A course that must be completed before enrolling in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CoursePrerequisite {
    /// The course that has the requirement.
    pub course_id: Uuid,
    /// The course that must be completed first.
    pub prerequisite_id: Uuid,
}
