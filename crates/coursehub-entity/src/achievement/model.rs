//! Achievement entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Name of the badge granted when a course reaches 100 percent.
pub const COURSE_COMPLETER: &str = "Course Completer";

/// A named badge template.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    /// Unique achievement identifier.
    pub id: Uuid,
    /// Unique badge name.
    pub name: String,
    /// What the badge is awarded for.
    pub description: String,
    /// Icon name or URL.
    pub icon: Option<String>,
}

/// A badge granted to a user. Unique per `(user_id, achievement_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserAchievement {
    /// Unique grant identifier.
    pub id: Uuid,
    /// The recipient.
    pub user_id: Uuid,
    /// The badge.
    pub achievement_id: Uuid,
    /// When it was granted.
    pub earned_at: DateTime<Utc>,
}

/// A grant joined with its badge, for dashboards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EarnedAchievement {
    /// The badge.
    #[sqlx(flatten)]
    pub achievement: Achievement,
    /// When it was granted.
    pub earned_at: DateTime<Utc>,
}
