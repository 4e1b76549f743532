//! Activity entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::ActivityType;

/// Immutable log entry. Rows are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Unique activity identifier.
    pub id: Uuid,
    /// The acting user.
    pub user_id: Uuid,
    /// What happened.
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    /// Free-form context (course and lesson ids and names).
    pub metadata: serde_json::Value,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}

/// Data required to append an activity.
#[derive(Debug, Clone)]
pub struct NewActivity {
    /// The acting user.
    pub user_id: Uuid,
    /// What happened.
    pub activity_type: ActivityType,
    /// Free-form context.
    pub metadata: serde_json::Value,
}

impl NewActivity {
    /// Build a new activity entry.
    pub fn new(user_id: Uuid, activity_type: ActivityType, metadata: serde_json::Value) -> Self {
        Self {
            user_id,
            activity_type,
            metadata,
        }
    }

    /// Stamp the entry into a full row.
    pub fn into_activity(self, created_at: DateTime<Utc>) -> Activity {
        Activity {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            activity_type: self.activity_type,
            metadata: self.metadata,
            created_at,
        }
    }
}
