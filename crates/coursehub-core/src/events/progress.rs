//! Progress-related events.

use serde::{Deserialize, Serialize};

use super::ClientEvent;
use crate::types::id::{CourseId, LessonId};

/// Emitted after a lesson completion has been recorded and the course
/// percentage recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdated {
    /// The lesson that was completed.
    pub lesson_id: LessonId,
    /// The course the lesson belongs to.
    pub course_id: CourseId,
    /// Course completion percentage after the update.
    pub progress: i32,
}

impl ClientEvent for ProgressUpdated {
    fn event_name(&self) -> &'static str {
        "progress:updated"
    }
}
