//! Achievement repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use coursehub_core::result::AppResult;
use coursehub_entity::achievement::EarnedAchievement;

use super::db_error;
use crate::store::{AchievementStore, GrantOutcome};

/// Repository for achievement grants.
#[derive(Debug, Clone)]
pub struct AchievementRepository {
    pool: PgPool,
}

impl AchievementRepository {
    /// Create a new achievement repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AchievementStore for AchievementRepository {
    async fn grant_if_absent(&self, user_id: Uuid, name: &str) -> AppResult<GrantOutcome> {
        let achievement_id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM achievements WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to find achievement"))?;

        let Some(achievement_id) = achievement_id else {
            return Ok(GrantOutcome::UnknownAchievement);
        };

        let result = sqlx::query(
            "INSERT INTO user_achievements (user_id, achievement_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, achievement_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(achievement_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to grant achievement"))?;

        if result.rows_affected() == 0 {
            debug!(user_id = %user_id, achievement = name, "Achievement already held");
            Ok(GrantOutcome::AlreadyHeld)
        } else {
            Ok(GrantOutcome::Granted)
        }
    }

    async fn earned(&self, user_id: Uuid) -> AppResult<Vec<EarnedAchievement>> {
        sqlx::query_as::<_, EarnedAchievement>(
            "SELECT a.id, a.name, a.description, a.icon, ua.earned_at \
             FROM user_achievements ua JOIN achievements a ON a.id = ua.achievement_id \
             WHERE ua.user_id = $1 ORDER BY ua.earned_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list achievements"))
    }
}
