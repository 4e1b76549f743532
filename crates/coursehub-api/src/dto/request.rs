//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use coursehub_entity::progress::ProgressPatch;

/// Body of `POST /api/progress/lesson/{lessonId}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressRequest {
    /// Mark the lesson completed or not.
    pub completed: Option<bool>,
    /// Seconds watched; replaces the stored value.
    #[validate(range(min = 0, message = "watchTime must be a non-negative integer"))]
    pub watch_time: Option<i32>,
}

impl From<UpdateProgressRequest> for ProgressPatch {
    fn from(req: UpdateProgressRequest) -> Self {
        Self {
            completed: req.completed,
            watch_time: req.watch_time,
        }
    }
}

/// Body of `POST /api/enrollments`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    /// Course to enroll in.
    pub course_id: Uuid,
}
