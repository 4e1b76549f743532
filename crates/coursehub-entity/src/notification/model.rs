//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::NotificationType;

/// A notification stored for a user's feed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The recipient user.
    pub user_id: Uuid,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Notification category.
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    /// Client route to open.
    pub link: Option<String>,
    /// Whether the user has read this notification.
    #[serde(rename = "read")]
    pub is_read: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    /// The recipient user.
    pub user_id: Uuid,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Notification category.
    pub notification_type: NotificationType,
    /// Client route to open.
    pub link: Option<String>,
}

impl NewNotification {
    /// Stamp the notification into an unread row.
    pub fn into_notification(self, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            notification_type: self.notification_type,
            link: self.link,
            is_read: false,
            created_at,
        }
    }
}
