//! Lesson progress repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use coursehub_core::result::AppResult;
use coursehub_entity::progress::{Progress, ProgressPatch, RecentCompletion};

use super::db_error;
use crate::store::ProgressStore;

/// Repository for per-lesson progress rows.
#[derive(Debug, Clone)]
pub struct ProgressRepository {
    pool: PgPool,
}

impl ProgressRepository {
    /// Create a new progress repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressStore for ProgressRepository {
    async fn find_progress(&self, user_id: Uuid, lesson_id: Uuid) -> AppResult<Option<Progress>> {
        sqlx::query_as::<_, Progress>(
            "SELECT * FROM progress WHERE user_id = $1 AND lesson_id = $2",
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find progress"))
    }

    /// Single-statement upsert. `$3`/`$4` are NULL when the field was
    /// omitted, in which case the stored value is kept on conflict.
    async fn upsert_progress(
        &self,
        user_id: Uuid,
        lesson_id: Uuid,
        patch: ProgressPatch,
    ) -> AppResult<Progress> {
        sqlx::query_as::<_, Progress>(
            "INSERT INTO progress (user_id, lesson_id, completed, completed_at, watch_time) \
             VALUES ($1, $2, COALESCE($3, FALSE), \
                     CASE WHEN COALESCE($3, FALSE) THEN NOW() END, COALESCE($4, 0)) \
             ON CONFLICT (user_id, lesson_id) DO UPDATE SET \
                 completed = COALESCE($3, progress.completed), \
                 completed_at = CASE \
                     WHEN $3 IS NULL THEN progress.completed_at \
                     WHEN $3 THEN NOW() \
                     ELSE NULL END, \
                 watch_time = COALESCE($4, progress.watch_time), \
                 updated_at = NOW() \
             RETURNING *",
        )
        .bind(user_id)
        .bind(lesson_id)
        .bind(patch.completed)
        .bind(patch.watch_time)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to upsert progress"))
    }

    async fn progress_for_lessons(
        &self,
        user_id: Uuid,
        lesson_ids: &[Uuid],
    ) -> AppResult<Vec<Progress>> {
        sqlx::query_as::<_, Progress>(
            "SELECT * FROM progress WHERE user_id = $1 AND lesson_id = ANY($2)",
        )
        .bind(user_id)
        .bind(lesson_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load progress"))
    }

    async fn count_completed_in_course(&self, user_id: Uuid, course_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM progress p \
             JOIN lessons l ON l.id = p.lesson_id \
             JOIN course_modules m ON m.id = l.module_id \
             WHERE p.user_id = $1 AND m.course_id = $2 AND p.completed AND l.is_published",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count completed lessons"))
    }

    async fn count_completed(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM progress WHERE user_id = $1 AND completed")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count completed lessons"))
    }

    async fn total_watch_time(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(watch_time), 0)::BIGINT FROM progress WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to sum watch time"))
    }

    async fn recent_completions(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<RecentCompletion>> {
        sqlx::query_as::<_, RecentCompletion>(
            "SELECT l.id AS lesson_id, l.title AS lesson_title, m.title AS module_title, \
                    c.id AS course_id, c.title AS course_title, c.thumbnail AS course_thumbnail, \
                    p.completed_at \
             FROM progress p \
             JOIN lessons l ON l.id = p.lesson_id \
             JOIN course_modules m ON m.id = l.module_id \
             JOIN courses c ON c.id = m.course_id \
             WHERE p.user_id = $1 AND p.completed AND p.completed_at IS NOT NULL \
             ORDER BY p.completed_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load recent completions"))
    }
}
