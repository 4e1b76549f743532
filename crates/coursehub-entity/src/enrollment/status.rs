//! Enrollment status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of an enrollment.
///
/// `Active` moves to `Completed` when progress reaches 100 or to `Dropped`
/// on an explicit drop. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "enrollment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    /// The learner is taking the course.
    Active,
    /// Every published lesson has been completed.
    Completed,
    /// The learner left the course.
    Dropped,
}

impl EnrollmentStatus {
    /// Return the status as its stored string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Dropped => "DROPPED",
        }
    }

    /// Whether the enrollment may still be dropped.
    pub fn can_drop(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EnrollmentStatus {
    type Err = coursehub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "COMPLETED" => Ok(Self::Completed),
            "DROPPED" => Ok(Self::Dropped),
            _ => Err(coursehub_core::AppError::validation(format!(
                "Invalid enrollment status: '{s}'. Expected one of: ACTIVE, COMPLETED, DROPPED"
            ))),
        }
    }
}
