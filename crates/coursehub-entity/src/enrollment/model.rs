//! Enrollment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::EnrollmentStatus;

/// A user's enrollment in a course. Unique per `(user_id, course_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    /// Unique enrollment identifier.
    pub id: Uuid,
    /// The enrolled user.
    pub user_id: Uuid,
    /// The course.
    pub course_id: Uuid,
    /// Lifecycle status.
    pub status: EnrollmentStatus,
    /// Completion percentage, 0 to 100.
    pub progress: i32,
    /// When the user enrolled.
    pub enrolled_at: DateTime<Utc>,
    /// When the course was completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Enrollment {
    /// Build a fresh active enrollment.
    pub fn new_active(user_id: Uuid, course_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            status: EnrollmentStatus::Active,
            progress: 0,
            enrolled_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Whether the enrollment belongs to `user_id`.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// An enrollment joined with its course, for dashboards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentSummary {
    /// Enrollment identifier.
    pub id: Uuid,
    /// The course.
    pub course_id: Uuid,
    /// Course title.
    pub course_title: String,
    /// Course thumbnail.
    pub course_thumbnail: Option<String>,
    /// Completion percentage.
    pub progress: i32,
    /// Lifecycle status.
    pub status: EnrollmentStatus,
    /// When the user enrolled.
    pub enrolled_at: DateTime<Utc>,
}

/// Enrollment counts per status for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentCounts {
    /// All enrollments.
    pub total: i64,
    /// `ACTIVE` enrollments.
    pub active: i64,
    /// `COMPLETED` enrollments.
    pub completed: i64,
    /// `DROPPED` enrollments.
    pub dropped: i64,
}

impl EnrollmentCounts {
    /// Tally a list of statuses.
    pub fn tally(statuses: impl IntoIterator<Item = EnrollmentStatus>) -> Self {
        statuses.into_iter().fold(Self::default(), |mut acc, status| {
            acc.total += 1;
            match status {
                EnrollmentStatus::Active => acc.active += 1,
                EnrollmentStatus::Completed => acc.completed += 1,
                EnrollmentStatus::Dropped => acc.dropped += 1,
            }
            acc
        })
    }
}
