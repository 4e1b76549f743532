//! Store traits the service layer is written against.
//!
//! Each trait covers one aggregate. The PostgreSQL repositories in
//! [`crate::repositories`] implement them for production; the `memory`
//! feature provides an in-process implementation for tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use coursehub_core::result::AppResult;
use coursehub_core::types::pagination::PageRequest;
use coursehub_entity::achievement::EarnedAchievement;
use coursehub_entity::activity::{Activity, ActivityType, NewActivity};
use coursehub_entity::course::{Course, CoursePrerequisite};
use coursehub_entity::enrollment::{
    Enrollment, EnrollmentCounts, EnrollmentStatus, EnrollmentSummary,
};
use coursehub_entity::lesson::{CourseModule, Lesson, LessonContext};
use coursehub_entity::notification::{NewNotification, Notification};
use coursehub_entity::progress::{Progress, ProgressPatch, RecentCompletion};
use coursehub_entity::user::User;

use crate::repositories::{
    AchievementRepository, ActivityRepository, CourseRepository, EnrollmentRepository,
    NotificationRepository, ProgressRepository, UserRepository,
};

/// Result of recomputing a course percentage onto an enrollment.
#[derive(Debug, Clone, Serialize)]
pub struct CourseProgressUpdate {
    /// The enrollment after the write.
    pub enrollment: Enrollment,
    /// Percentage computed from lesson counts, before the monotonic clamp.
    pub computed: i32,
    /// Whether this write moved the enrollment from `ACTIVE` to `COMPLETED`.
    pub completed_now: bool,
}

/// Outcome of an idempotent achievement grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    /// A new grant row was created.
    Granted,
    /// The user already held the achievement.
    AlreadyHeld,
    /// No achievement template with that name exists.
    UnknownAchievement,
}

/// Read access to courses and their structure.
#[async_trait]
pub trait CourseStore: Send + Sync + 'static {
    /// Find a course by id.
    async fn find_course(&self, course_id: Uuid) -> AppResult<Option<Course>>;

    /// Prerequisites declared by a course.
    async fn prerequisites(&self, course_id: Uuid) -> AppResult<Vec<CoursePrerequisite>>;

    /// Modules of a course ordered by their sort key.
    async fn modules(&self, course_id: Uuid) -> AppResult<Vec<CourseModule>>;

    /// Published lessons of a course ordered by module, then lesson.
    async fn published_lessons(&self, course_id: Uuid) -> AppResult<Vec<Lesson>>;

    /// Number of published lessons in a course.
    async fn count_published_lessons(&self, course_id: Uuid) -> AppResult<i64>;

    /// Find a lesson together with its course.
    async fn find_lesson(&self, lesson_id: Uuid) -> AppResult<Option<LessonContext>>;
}

/// Read access to users.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Find a user by id.
    async fn find_user(&self, user_id: Uuid) -> AppResult<Option<User>>;
}

/// Enrollment persistence.
#[async_trait]
pub trait EnrollmentStore: Send + Sync + 'static {
    /// Find the enrollment for `(user_id, course_id)`.
    async fn find_enrollment(&self, user_id: Uuid, course_id: Uuid)
    -> AppResult<Option<Enrollment>>;

    /// Find an enrollment by id.
    async fn find_enrollment_by_id(&self, enrollment_id: Uuid) -> AppResult<Option<Enrollment>>;

    /// Insert an enrollment. A second row for the same pair is a `Conflict`.
    async fn create_enrollment(&self, enrollment: &Enrollment) -> AppResult<Enrollment>;

    /// Move an `ACTIVE` enrollment to `DROPPED` in one conditional write.
    ///
    /// Returns `None` when no row was changed: the enrollment is missing or
    /// is no longer `ACTIVE` at the time of the write.
    async fn drop_if_active(&self, enrollment_id: Uuid) -> AppResult<Option<Enrollment>>;

    /// One page of a user's enrollments, newest first, with the total count.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<EnrollmentStatus>,
        page: PageRequest,
    ) -> AppResult<(Vec<Enrollment>, u64)>;

    /// Every enrollment of a user joined with its course, newest first.
    async fn summaries_for_user(&self, user_id: Uuid) -> AppResult<Vec<EnrollmentSummary>>;

    /// Enrollment counts per status.
    async fn counts_for_user(&self, user_id: Uuid) -> AppResult<EnrollmentCounts>;

    /// Which of `course_ids` the user has completed.
    async fn completed_course_ids(&self, user_id: Uuid, course_ids: &[Uuid])
    -> AppResult<Vec<Uuid>>;

    /// Recompute the course percentage from lesson counts and write it onto
    /// the enrollment, atomically with respect to other writers of the same
    /// enrollment. Returns `None` when no enrollment exists.
    ///
    /// The stored percentage never decreases unless the enrollment is
    /// `DROPPED`. Reaching 100 moves an `ACTIVE` enrollment to `COMPLETED`.
    async fn record_course_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<CourseProgressUpdate>>;
}

/// Lesson progress persistence.
#[async_trait]
pub trait ProgressStore: Send + Sync + 'static {
    /// Find the progress row for `(user_id, lesson_id)`.
    async fn find_progress(&self, user_id: Uuid, lesson_id: Uuid) -> AppResult<Option<Progress>>;

    /// Insert or update the progress row for `(user_id, lesson_id)`.
    async fn upsert_progress(
        &self,
        user_id: Uuid,
        lesson_id: Uuid,
        patch: ProgressPatch,
    ) -> AppResult<Progress>;

    /// Progress rows of a user for the given lessons.
    async fn progress_for_lessons(
        &self,
        user_id: Uuid,
        lesson_ids: &[Uuid],
    ) -> AppResult<Vec<Progress>>;

    /// Completed published lessons of a course for a user.
    async fn count_completed_in_course(&self, user_id: Uuid, course_id: Uuid) -> AppResult<i64>;

    /// Completed lessons across all courses.
    async fn count_completed(&self, user_id: Uuid) -> AppResult<i64>;

    /// Sum of watch time across all lessons, in seconds.
    async fn total_watch_time(&self, user_id: Uuid) -> AppResult<i64>;

    /// Most recent completions, newest first.
    async fn recent_completions(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<RecentCompletion>>;
}

/// Append-only activity log.
#[async_trait]
pub trait ActivityStore: Send + Sync + 'static {
    /// Append an entry.
    async fn append(&self, activity: NewActivity) -> AppResult<Activity>;

    /// Newest entries of the given types.
    async fn recent(
        &self,
        user_id: Uuid,
        types: &[ActivityType],
        limit: i64,
    ) -> AppResult<Vec<Activity>>;

    /// Timestamps of every `LESSON_COMPLETE` entry, newest first.
    async fn lesson_completion_times(&self, user_id: Uuid) -> AppResult<Vec<DateTime<Utc>>>;
}

/// Achievement grants.
#[async_trait]
pub trait AchievementStore: Send + Sync + 'static {
    /// Grant the named achievement unless the user already holds it.
    async fn grant_if_absent(&self, user_id: Uuid, name: &str) -> AppResult<GrantOutcome>;

    /// Achievements held by a user, newest first.
    async fn earned(&self, user_id: Uuid) -> AppResult<Vec<EarnedAchievement>>;
}

/// Notification persistence.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Store a notification for a user.
    async fn create_notification(&self, notification: NewNotification)
    -> AppResult<Notification>;
}

/// Every store the services need, behind trait objects.
#[derive(Clone)]
pub struct Stores {
    /// Courses, modules and lessons.
    pub courses: Arc<dyn CourseStore>,
    /// Users.
    pub users: Arc<dyn UserStore>,
    /// Enrollments.
    pub enrollments: Arc<dyn EnrollmentStore>,
    /// Lesson progress.
    pub progress: Arc<dyn ProgressStore>,
    /// Activity log.
    pub activities: Arc<dyn ActivityStore>,
    /// Achievement grants.
    pub achievements: Arc<dyn AchievementStore>,
    /// Notifications.
    pub notifications: Arc<dyn NotificationStore>,
}

impl Stores {
    /// Stores backed by the PostgreSQL repositories.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            courses: Arc::new(CourseRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool.clone())),
            enrollments: Arc::new(EnrollmentRepository::new(pool.clone())),
            progress: Arc::new(ProgressRepository::new(pool.clone())),
            activities: Arc::new(ActivityRepository::new(pool.clone())),
            achievements: Arc::new(AchievementRepository::new(pool.clone())),
            notifications: Arc::new(NotificationRepository::new(pool)),
        }
    }

    /// Stores backed by a single in-memory store.
    #[cfg(feature = "memory")]
    pub fn memory(store: Arc<crate::memory::MemoryStore>) -> Self {
        Self {
            courses: store.clone(),
            users: store.clone(),
            enrollments: store.clone(),
            progress: store.clone(),
            activities: store.clone(),
            achievements: store.clone(),
            notifications: store,
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
