//! Enrollment repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::result::AppResult;
use coursehub_core::types::pagination::PageRequest;
use coursehub_entity::enrollment::{
    Enrollment, EnrollmentCounts, EnrollmentStatus, EnrollmentSummary,
};
use coursehub_entity::progress::completion_percentage;

use super::db_error;
use crate::store::{CourseProgressUpdate, EnrollmentStore};

/// Name of the unique constraint on `(user_id, course_id)`.
const ENROLLMENT_UNIQUE: &str = "enrollments_user_id_course_id_key";

/// Repository for enrollment rows.
#[derive(Debug, Clone)]
pub struct EnrollmentRepository {
    pool: PgPool,
}

impl EnrollmentRepository {
    /// Create a new enrollment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrollmentStore for EnrollmentRepository {
    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<Enrollment>> {
        sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE user_id = $1 AND course_id = $2",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find enrollment"))
    }

    async fn find_enrollment_by_id(&self, enrollment_id: Uuid) -> AppResult<Option<Enrollment>> {
        sqlx::query_as::<_, Enrollment>("SELECT * FROM enrollments WHERE id = $1")
            .bind(enrollment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find enrollment"))
    }

    async fn create_enrollment(&self, enrollment: &Enrollment) -> AppResult<Enrollment> {
        sqlx::query_as::<_, Enrollment>(
            "INSERT INTO enrollments (id, user_id, course_id, status, progress, enrolled_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(enrollment.id)
        .bind(enrollment.user_id)
        .bind(enrollment.course_id)
        .bind(enrollment.status)
        .bind(enrollment.progress)
        .bind(enrollment.enrolled_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(ENROLLMENT_UNIQUE) => {
                AppError::conflict("Already enrolled in this course")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create enrollment", e),
        })
    }

    async fn drop_if_active(&self, enrollment_id: Uuid) -> AppResult<Option<Enrollment>> {
        sqlx::query_as::<_, Enrollment>(
            "UPDATE enrollments SET status = 'DROPPED' \
             WHERE id = $1 AND status = 'ACTIVE' RETURNING *",
        )
        .bind(enrollment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to drop enrollment"))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<EnrollmentStatus>,
        page: PageRequest,
    ) -> AppResult<(Vec<Enrollment>, u64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM enrollments \
             WHERE user_id = $1 AND ($2::enrollment_status IS NULL OR status = $2)",
        )
        .bind(user_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count enrollments"))?;

        let items = sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments \
             WHERE user_id = $1 AND ($2::enrollment_status IS NULL OR status = $2) \
             ORDER BY enrolled_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(status)
        .bind(page.limit as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list enrollments"))?;

        Ok((items, total.max(0) as u64))
    }

    async fn summaries_for_user(&self, user_id: Uuid) -> AppResult<Vec<EnrollmentSummary>> {
        sqlx::query_as::<_, EnrollmentSummary>(
            "SELECT e.id, e.course_id, c.title AS course_title, c.thumbnail AS course_thumbnail, \
                    e.progress, e.status, e.enrolled_at \
             FROM enrollments e JOIN courses c ON c.id = e.course_id \
             WHERE e.user_id = $1 ORDER BY e.enrolled_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list enrollment summaries"))
    }

    async fn counts_for_user(&self, user_id: Uuid) -> AppResult<EnrollmentCounts> {
        let statuses: Vec<EnrollmentStatus> =
            sqlx::query_scalar("SELECT status FROM enrollments WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("Failed to count enrollments"))?;
        Ok(EnrollmentCounts::tally(statuses))
    }

    async fn completed_course_ids(
        &self,
        user_id: Uuid,
        course_ids: &[Uuid],
    ) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar(
            "SELECT course_id FROM enrollments \
             WHERE user_id = $1 AND course_id = ANY($2) AND status = 'COMPLETED'",
        )
        .bind(user_id)
        .bind(course_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to check completed courses"))
    }

    async fn record_course_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<CourseProgressUpdate>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        // Row lock serializes concurrent completions for the same enrollment.
        let current = sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE user_id = $1 AND course_id = $2 FOR UPDATE",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock enrollment"))?;

        let Some(current) = current else {
            return Ok(None);
        };

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM lessons l JOIN course_modules m ON m.id = l.module_id \
             WHERE m.course_id = $1 AND l.is_published",
        )
        .bind(course_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to count lessons"))?;

        let completed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM progress p \
             JOIN lessons l ON l.id = p.lesson_id \
             JOIN course_modules m ON m.id = l.module_id \
             WHERE p.user_id = $1 AND m.course_id = $2 AND p.completed AND l.is_published",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to count completed lessons"))?;

        let computed = completion_percentage(completed, total);
        let (progress, status, completed_now) = next_state(&current, computed);

        let enrollment = sqlx::query_as::<_, Enrollment>(
            "UPDATE enrollments SET progress = $2, status = $3, \
                 completed_at = CASE WHEN $4 THEN NOW() ELSE completed_at END \
             WHERE id = $1 RETURNING *",
        )
        .bind(current.id)
        .bind(progress)
        .bind(status)
        .bind(completed_now)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to update enrollment progress"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit enrollment progress"))?;

        if completed_now {
            info!(
                user_id = %user_id,
                course_id = %course_id,
                enrollment_id = %enrollment.id,
                "Enrollment completed"
            );
        }

        Ok(Some(CourseProgressUpdate {
            enrollment,
            computed,
            completed_now,
        }))
    }
}

/// Progress, status, and transition flag after applying `computed`.
///
/// Shared with the in-memory store so both backends follow the same rules.
pub(crate) fn next_state(current: &Enrollment, computed: i32) -> (i32, EnrollmentStatus, bool) {
    match current.status {
        EnrollmentStatus::Dropped => (computed, EnrollmentStatus::Dropped, false),
        EnrollmentStatus::Completed => (current.progress.max(computed), current.status, false),
        EnrollmentStatus::Active => {
            let progress = current.progress.max(computed);
            if progress >= 100 {
                (100, EnrollmentStatus::Completed, true)
            } else {
                (progress, EnrollmentStatus::Active, false)
            }
        }
    }
}
