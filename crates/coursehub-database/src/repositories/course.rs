//! Course, module, and lesson repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use coursehub_core::result::AppResult;
use coursehub_entity::course::{Course, CoursePrerequisite};
use coursehub_entity::lesson::{CourseModule, Lesson, LessonContext};

use super::db_error;
use crate::store::CourseStore;

/// Repository for course structure reads.
#[derive(Debug, Clone)]
pub struct CourseRepository {
    pool: PgPool,
}

impl CourseRepository {
    /// Create a new course repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseStore for CourseRepository {
    async fn find_course(&self, course_id: Uuid) -> AppResult<Option<Course>> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find course"))
    }

    async fn prerequisites(&self, course_id: Uuid) -> AppResult<Vec<CoursePrerequisite>> {
        sqlx::query_as::<_, CoursePrerequisite>(
            "SELECT course_id, prerequisite_id FROM course_prerequisites WHERE course_id = $1",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load prerequisites"))
    }

    async fn modules(&self, course_id: Uuid) -> AppResult<Vec<CourseModule>> {
        sqlx::query_as::<_, CourseModule>(
            "SELECT id, course_id, title, sort_order FROM course_modules \
             WHERE course_id = $1 ORDER BY sort_order",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load modules"))
    }

    async fn published_lessons(&self, course_id: Uuid) -> AppResult<Vec<Lesson>> {
        sqlx::query_as::<_, Lesson>(
            "SELECT l.id, l.module_id, l.title, l.duration, l.sort_order, l.is_published \
             FROM lessons l JOIN course_modules m ON m.id = l.module_id \
             WHERE m.course_id = $1 AND l.is_published \
             ORDER BY m.sort_order, l.sort_order",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load lessons"))
    }

    async fn count_published_lessons(&self, course_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM lessons l JOIN course_modules m ON m.id = l.module_id \
             WHERE m.course_id = $1 AND l.is_published",
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count lessons"))
    }

    async fn find_lesson(&self, lesson_id: Uuid) -> AppResult<Option<LessonContext>> {
        sqlx::query_as::<_, LessonContext>(
            "SELECT l.id, l.module_id, l.title, l.duration, l.sort_order, l.is_published, \
                    c.id AS course_id, c.title AS course_title \
             FROM lessons l \
             JOIN course_modules m ON m.id = l.module_id \
             JOIN courses c ON c.id = m.course_id \
             WHERE l.id = $1",
        )
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find lesson"))
    }
}
