//! Progress entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-user, per-lesson progress. Unique per `(user_id, lesson_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Unique progress identifier.
    pub id: Uuid,
    /// The learner.
    pub user_id: Uuid,
    /// The lesson.
    pub lesson_id: Uuid,
    /// Whether the lesson is completed.
    pub completed: bool,
    /// Set iff `completed` is true.
    pub completed_at: Option<DateTime<Utc>>,
    /// Watched seconds as last reported by the client.
    pub watch_time: i32,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last written.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by a progress update. `None` leaves the stored value
/// untouched on update and falls back to the default on insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressPatch {
    /// New completion flag.
    pub completed: Option<bool>,
    /// New watch time in seconds (overwrites, never adds).
    pub watch_time: Option<i32>,
}

impl ProgressPatch {
    /// Whether this patch marks the lesson completed.
    pub fn marks_completed(&self) -> bool {
        self.completed == Some(true)
    }

    /// Apply the patch to an existing row, stamping `completed_at`.
    pub fn apply(&self, progress: &mut Progress, now: DateTime<Utc>) {
        if let Some(completed) = self.completed {
            progress.completed = completed;
            progress.completed_at = completed.then_some(now);
        }
        if let Some(watch_time) = self.watch_time {
            progress.watch_time = watch_time;
        }
        progress.updated_at = now;
    }

    /// Materialize the first row for `(user_id, lesson_id)`.
    pub fn create(&self, user_id: Uuid, lesson_id: Uuid, now: DateTime<Utc>) -> Progress {
        let completed = self.completed.unwrap_or(false);
        Progress {
            id: Uuid::new_v4(),
            user_id,
            lesson_id,
            completed,
            completed_at: completed.then_some(now),
            watch_time: self.watch_time.unwrap_or(0),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A completed lesson with its module and course, for the overview feed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentCompletion {
    /// The lesson.
    pub lesson_id: Uuid,
    /// Lesson title.
    pub lesson_title: String,
    /// Title of the lesson's module.
    pub module_title: String,
    /// The course.
    pub course_id: Uuid,
    /// Course title.
    pub course_title: String,
    /// Course thumbnail.
    pub course_thumbnail: Option<String>,
    /// When the lesson was completed.
    pub completed_at: DateTime<Utc>,
}
