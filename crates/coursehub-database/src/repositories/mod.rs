//! PostgreSQL implementations of the store traits.

pub mod achievement;
pub mod activity;
pub mod course;
pub mod enrollment;
pub mod notification;
pub mod progress;
pub mod user;

pub use achievement::AchievementRepository;
pub use activity::ActivityRepository;
pub use course::CourseRepository;
pub use enrollment::EnrollmentRepository;
pub use notification::NotificationRepository;
pub use progress::ProgressRepository;
pub use user::UserRepository;

use coursehub_core::error::{AppError, ErrorKind};

/// Wrap a sqlx error into a database `AppError` with context.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}
