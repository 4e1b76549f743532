//! Module and lesson entity models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An ordered section of a course.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CourseModule {
    /// Unique module identifier.
    pub id: Uuid,
    /// Owning course.
    pub course_id: Uuid,
    /// Module title.
    pub title: String,
    /// Sort key within the course.
    #[serde(rename = "order")]
    pub sort_order: i32,
}

/// A single lesson inside a module.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// Unique lesson identifier.
    pub id: Uuid,
    /// Owning module.
    pub module_id: Uuid,
    /// Lesson title.
    pub title: String,
    /// Length of the lesson in seconds.
    pub duration: i32,
    /// Sort key within the module.
    #[serde(rename = "order")]
    pub sort_order: i32,
    /// Only published lessons count toward completion.
    #[serde(rename = "published")]
    pub is_published: bool,
}

/// A lesson joined with the course it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LessonContext {
    /// The lesson row.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub lesson: Lesson,
    /// Course reached through the lesson's module.
    pub course_id: Uuid,
    /// Title of that course.
    pub course_title: String,
}
