//! Notification repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use coursehub_core::result::AppResult;
use coursehub_entity::notification::{NewNotification, Notification};

use super::db_error;
use crate::store::NotificationStore;

/// Repository for notification writes.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, title, message, notification_type, link) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.notification_type)
        .bind(&notification.link)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create notification"))
    }
}
