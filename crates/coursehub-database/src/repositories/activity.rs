//! Activity log repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use coursehub_core::result::AppResult;
use coursehub_entity::activity::{Activity, ActivityType, NewActivity};

use super::db_error;
use crate::store::ActivityStore;

/// Repository for the append-only activity log.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    /// Create a new activity repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityStore for ActivityRepository {
    async fn append(&self, activity: NewActivity) -> AppResult<Activity> {
        sqlx::query_as::<_, Activity>(
            "INSERT INTO activities (user_id, activity_type, metadata) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(activity.user_id)
        .bind(activity.activity_type)
        .bind(&activity.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to append activity"))
    }

    async fn recent(
        &self,
        user_id: Uuid,
        types: &[ActivityType],
        limit: i64,
    ) -> AppResult<Vec<Activity>> {
        sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities WHERE user_id = $1 AND activity_type = ANY($2) \
             ORDER BY created_at DESC LIMIT $3",
        )
        .bind(user_id)
        .bind(types)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list activities"))
    }

    async fn lesson_completion_times(&self, user_id: Uuid) -> AppResult<Vec<DateTime<Utc>>> {
        sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT created_at FROM activities \
             WHERE user_id = $1 AND activity_type = 'LESSON_COMPLETE' \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load lesson completions"))
    }
}
