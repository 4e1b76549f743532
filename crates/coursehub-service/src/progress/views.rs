//! Read models returned by the progress readers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use coursehub_entity::enrollment::EnrollmentStatus;
use coursehub_entity::lesson::{CourseModule, Lesson};
use coursehub_entity::progress::{Progress, RecentCompletion};

/// One lesson in a course breakdown with the caller's progress, if any.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgressItem {
    pub id: Uuid,
    pub title: String,
    pub duration: i32,
    pub order: i32,
    pub progress: Option<Progress>,
}

impl LessonProgressItem {
    pub(crate) fn new(lesson: &Lesson, progress: Option<Progress>) -> Self {
        Self {
            id: lesson.id,
            title: lesson.title.clone(),
            duration: lesson.duration,
            order: lesson.sort_order,
            progress,
        }
    }
}

/// Published lessons of one module.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    pub module_id: Uuid,
    pub module_title: String,
    pub module_order: i32,
    pub lessons: Vec<LessonProgressItem>,
}

impl ModuleProgress {
    pub(crate) fn new(module: &CourseModule) -> Self {
        Self {
            module_id: module.id,
            module_title: module.title.clone(),
            module_order: module.sort_order,
            lessons: Vec::new(),
        }
    }
}

/// Module-by-module progress through one course.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub course_id: Uuid,
    pub total_lessons: i64,
    pub completed_lessons: i64,
    pub progress_percentage: i32,
    /// Seconds watched across the course's published lessons.
    pub total_watch_time: i64,
    pub modules: Vec<ModuleProgress>,
}

/// One enrollment as listed on the overall dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentOverview {
    pub course_id: Uuid,
    pub course_title: String,
    pub course_thumbnail: Option<String>,
    pub progress: i32,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
}

/// Cross-course summary for the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallProgress {
    pub total_enrollments: i64,
    pub active_enrollments: i64,
    pub completed_courses: i64,
    pub total_completed_lessons: i64,
    pub total_watch_time: i64,
    pub learning_streak: u32,
    pub recent_progress: Vec<RecentCompletion>,
    pub enrollments: Vec<EnrollmentOverview>,
}
