//! Read models returned by the enrollment service.

use serde::Serialize;

use coursehub_entity::achievement::EarnedAchievement;
use coursehub_entity::activity::Activity;
use coursehub_entity::course::Course;
use coursehub_entity::enrollment::{Enrollment, EnrollmentCounts};
use coursehub_entity::lesson::CourseModule;

use crate::progress::LessonProgressItem;

/// An enrollment in the "my courses" list with lesson counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyCourse {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub course: Option<Course>,
    pub total_lessons: i64,
    pub completed_lessons: i64,
    pub progress_percentage: i32,
}

/// A module with its published lessons and the caller's progress on each.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleOutline {
    #[serde(flatten)]
    pub module: CourseModule,
    pub lessons: Vec<LessonProgressItem>,
}

/// A course with its outline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseOutline {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<ModuleOutline>,
}

/// The caller's enrollment in one course, with the course outline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentDetail {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub course: CourseOutline,
}

/// Enrollment counts, recent activity and achievements.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentStats {
    pub stats: EnrollmentCounts,
    pub recent_activity: Vec<Activity>,
    pub achievements: Vec<EarnedAchievement>,
}
