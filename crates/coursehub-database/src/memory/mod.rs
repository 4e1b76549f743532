//! In-memory store for tests and local experiments.
//!
//! Implements every store trait over plain vectors behind one Tokio mutex,
//! which also gives `record_course_progress` the same atomicity as the
//! row lock used by the PostgreSQL repository.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_core::types::pagination::PageRequest;
use coursehub_entity::achievement::{Achievement, EarnedAchievement, UserAchievement};
use coursehub_entity::activity::{Activity, ActivityType, NewActivity};
use coursehub_entity::course::{Course, CoursePrerequisite, CourseStatus};
use coursehub_entity::enrollment::{
    Enrollment, EnrollmentCounts, EnrollmentStatus, EnrollmentSummary,
};
use coursehub_entity::lesson::{CourseModule, Lesson, LessonContext};
use coursehub_entity::notification::{NewNotification, Notification};
use coursehub_entity::progress::{
    Progress, ProgressPatch, RecentCompletion, completion_percentage,
};
use coursehub_entity::user::User;

use crate::repositories::enrollment::next_state;
use crate::store::{
    AchievementStore, ActivityStore, CourseProgressUpdate, CourseStore, EnrollmentStore,
    GrantOutcome, NotificationStore, ProgressStore, UserStore,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    courses: Vec<Course>,
    prerequisites: Vec<CoursePrerequisite>,
    modules: Vec<CourseModule>,
    lessons: Vec<Lesson>,
    enrollments: Vec<Enrollment>,
    progress: Vec<Progress>,
    activities: Vec<Activity>,
    achievements: Vec<Achievement>,
    user_achievements: Vec<UserAchievement>,
    notifications: Vec<Notification>,
}

impl Tables {
    fn module(&self, module_id: Uuid) -> Option<&CourseModule> {
        self.modules.iter().find(|m| m.id == module_id)
    }

    fn course_of_lesson(&self, lesson: &Lesson) -> Option<Uuid> {
        self.module(lesson.module_id).map(|m| m.course_id)
    }

    fn published_lessons(&self, course_id: Uuid) -> Vec<Lesson> {
        let mut lessons: Vec<(i32, Lesson)> = self
            .lessons
            .iter()
            .filter(|l| l.is_published)
            .filter_map(|l| {
                self.module(l.module_id)
                    .filter(|m| m.course_id == course_id)
                    .map(|m| (m.sort_order, l.clone()))
            })
            .collect();
        lessons.sort_by_key(|(module_order, l)| (*module_order, l.sort_order));
        lessons.into_iter().map(|(_, l)| l).collect()
    }

    fn count_completed_in_course(&self, user_id: Uuid, course_id: Uuid) -> i64 {
        let lesson_ids: Vec<Uuid> = self
            .published_lessons(course_id)
            .iter()
            .map(|l| l.id)
            .collect();
        self.progress
            .iter()
            .filter(|p| p.user_id == user_id && p.completed && lesson_ids.contains(&p.lesson_id))
            .count() as i64
    }
}

/// In-process implementation of every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_notifications: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Seeding ──────────────────────────────────────────────

    /// Insert a user and return it.
    pub async fn add_user(&self, email: &str, first_name: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: String::new(),
            created_at: Utc::now(),
        };
        self.tables.lock().await.users.push(user.clone());
        user
    }

    /// Insert a course and return it.
    pub async fn add_course(&self, title: &str, status: CourseStatus) -> Course {
        let now = Utc::now();
        let course = Course {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            thumbnail: None,
            status,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().await.courses.push(course.clone());
        course
    }

    /// Declare that `course_id` requires `prerequisite_id`.
    pub async fn add_prerequisite(&self, course_id: Uuid, prerequisite_id: Uuid) {
        self.tables
            .lock()
            .await
            .prerequisites
            .push(CoursePrerequisite {
                course_id,
                prerequisite_id,
            });
    }

    /// Insert a module and return it.
    pub async fn add_module(&self, course_id: Uuid, title: &str, sort_order: i32) -> CourseModule {
        let module = CourseModule {
            id: Uuid::new_v4(),
            course_id,
            title: title.to_string(),
            sort_order,
        };
        self.tables.lock().await.modules.push(module.clone());
        module
    }

    /// Insert a lesson and return it.
    pub async fn add_lesson(
        &self,
        module_id: Uuid,
        title: &str,
        sort_order: i32,
        is_published: bool,
    ) -> Lesson {
        let lesson = Lesson {
            id: Uuid::new_v4(),
            module_id,
            title: title.to_string(),
            duration: 300,
            sort_order,
            is_published,
        };
        self.tables.lock().await.lessons.push(lesson.clone());
        lesson
    }

    /// Insert an achievement template and return it.
    pub async fn add_achievement(&self, name: &str) -> Achievement {
        let achievement = Achievement {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            icon: None,
        };
        self.tables
            .lock()
            .await
            .achievements
            .push(achievement.clone());
        achievement
    }

    /// Insert an activity with an explicit timestamp.
    pub async fn add_activity_at(
        &self,
        user_id: Uuid,
        activity_type: ActivityType,
        created_at: DateTime<Utc>,
    ) {
        let activity = NewActivity::new(user_id, activity_type, serde_json::json!({}))
            .into_activity(created_at);
        self.tables.lock().await.activities.push(activity);
    }

    /// Make every subsequent notification write fail.
    pub fn fail_notifications(&self, fail: bool) {
        self.fail_notifications.store(fail, Ordering::SeqCst);
    }

    // ── Inspection ───────────────────────────────────────────

    /// Activities of a user of one type, oldest first.
    pub async fn activities_of(&self, user_id: Uuid, activity_type: ActivityType) -> Vec<Activity> {
        self.tables
            .lock()
            .await
            .activities
            .iter()
            .filter(|a| a.user_id == user_id && a.activity_type == activity_type)
            .cloned()
            .collect()
    }

    /// Notifications stored for a user, oldest first.
    pub async fn notifications_of(&self, user_id: Uuid) -> Vec<Notification> {
        self.tables
            .lock()
            .await
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Number of achievement grants held by a user.
    pub async fn grant_count(&self, user_id: Uuid) -> usize {
        self.tables
            .lock()
            .await
            .user_achievements
            .iter()
            .filter(|g| g.user_id == user_id)
            .count()
    }

    /// Number of enrollment rows for a pair.
    pub async fn enrollment_rows(&self, user_id: Uuid, course_id: Uuid) -> usize {
        self.tables
            .lock()
            .await
            .enrollments
            .iter()
            .filter(|e| e.user_id == user_id && e.course_id == course_id)
            .count()
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn find_course(&self, course_id: Uuid) -> AppResult<Option<Course>> {
        let t = self.tables.lock().await;
        Ok(t.courses.iter().find(|c| c.id == course_id).cloned())
    }

    async fn prerequisites(&self, course_id: Uuid) -> AppResult<Vec<CoursePrerequisite>> {
        let t = self.tables.lock().await;
        Ok(t.prerequisites
            .iter()
            .filter(|p| p.course_id == course_id)
            .copied()
            .collect())
    }

    async fn modules(&self, course_id: Uuid) -> AppResult<Vec<CourseModule>> {
        let t = self.tables.lock().await;
        let mut modules: Vec<CourseModule> = t
            .modules
            .iter()
            .filter(|m| m.course_id == course_id)
            .cloned()
            .collect();
        modules.sort_by_key(|m| m.sort_order);
        Ok(modules)
    }

    async fn published_lessons(&self, course_id: Uuid) -> AppResult<Vec<Lesson>> {
        Ok(self.tables.lock().await.published_lessons(course_id))
    }

    async fn count_published_lessons(&self, course_id: Uuid) -> AppResult<i64> {
        Ok(self.tables.lock().await.published_lessons(course_id).len() as i64)
    }

    async fn find_lesson(&self, lesson_id: Uuid) -> AppResult<Option<LessonContext>> {
        let t = self.tables.lock().await;
        let Some(lesson) = t.lessons.iter().find(|l| l.id == lesson_id) else {
            return Ok(None);
        };
        let course = t
            .course_of_lesson(lesson)
            .and_then(|course_id| t.courses.iter().find(|c| c.id == course_id));
        Ok(course.map(|c| LessonContext {
            lesson: lesson.clone(),
            course_id: c.id,
            course_title: c.title.clone(),
        }))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.iter().find(|u| u.id == user_id).cloned())
    }
}

#[async_trait]
impl EnrollmentStore for MemoryStore {
    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<Enrollment>> {
        let t = self.tables.lock().await;
        Ok(t.enrollments
            .iter()
            .find(|e| e.user_id == user_id && e.course_id == course_id)
            .cloned())
    }

    async fn find_enrollment_by_id(&self, enrollment_id: Uuid) -> AppResult<Option<Enrollment>> {
        let t = self.tables.lock().await;
        Ok(t.enrollments.iter().find(|e| e.id == enrollment_id).cloned())
    }

    async fn create_enrollment(&self, enrollment: &Enrollment) -> AppResult<Enrollment> {
        let mut t = self.tables.lock().await;
        if t.enrollments
            .iter()
            .any(|e| e.user_id == enrollment.user_id && e.course_id == enrollment.course_id)
        {
            return Err(AppError::conflict("Already enrolled in this course"));
        }
        t.enrollments.push(enrollment.clone());
        Ok(enrollment.clone())
    }

    async fn drop_if_active(&self, enrollment_id: Uuid) -> AppResult<Option<Enrollment>> {
        let mut t = self.tables.lock().await;
        Ok(t
            .enrollments
            .iter_mut()
            .find(|e| e.id == enrollment_id && e.status == EnrollmentStatus::Active)
            .map(|e| {
                e.status = EnrollmentStatus::Dropped;
                e.clone()
            }))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<EnrollmentStatus>,
        page: PageRequest,
    ) -> AppResult<(Vec<Enrollment>, u64)> {
        let t = self.tables.lock().await;
        let mut matching: Vec<Enrollment> = t
            .enrollments
            .iter()
            .filter(|e| e.user_id == user_id && status.is_none_or(|s| e.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.enrolled_at.cmp(&a.enrolled_at));
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok((items, total))
    }

    async fn summaries_for_user(&self, user_id: Uuid) -> AppResult<Vec<EnrollmentSummary>> {
        let t = self.tables.lock().await;
        let mut summaries: Vec<EnrollmentSummary> = t
            .enrollments
            .iter()
            .filter(|e| e.user_id == user_id)
            .filter_map(|e| {
                t.courses
                    .iter()
                    .find(|c| c.id == e.course_id)
                    .map(|c| EnrollmentSummary {
                        id: e.id,
                        course_id: c.id,
                        course_title: c.title.clone(),
                        course_thumbnail: c.thumbnail.clone(),
                        progress: e.progress,
                        status: e.status,
                        enrolled_at: e.enrolled_at,
                    })
            })
            .collect();
        summaries.sort_by(|a, b| b.enrolled_at.cmp(&a.enrolled_at));
        Ok(summaries)
    }

    async fn counts_for_user(&self, user_id: Uuid) -> AppResult<EnrollmentCounts> {
        let t = self.tables.lock().await;
        Ok(EnrollmentCounts::tally(
            t.enrollments
                .iter()
                .filter(|e| e.user_id == user_id)
                .map(|e| e.status),
        ))
    }

    async fn completed_course_ids(
        &self,
        user_id: Uuid,
        course_ids: &[Uuid],
    ) -> AppResult<Vec<Uuid>> {
        let t = self.tables.lock().await;
        Ok(t.enrollments
            .iter()
            .filter(|e| {
                e.user_id == user_id
                    && e.status == EnrollmentStatus::Completed
                    && course_ids.contains(&e.course_id)
            })
            .map(|e| e.course_id)
            .collect())
    }

    async fn record_course_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<CourseProgressUpdate>> {
        let mut t = self.tables.lock().await;
        let total = t.published_lessons(course_id).len() as i64;
        let completed = t.count_completed_in_course(user_id, course_id);
        let computed = completion_percentage(completed, total);

        let Some(enrollment) = t
            .enrollments
            .iter_mut()
            .find(|e| e.user_id == user_id && e.course_id == course_id)
        else {
            return Ok(None);
        };

        let (progress, status, completed_now) = next_state(enrollment, computed);
        enrollment.progress = progress;
        enrollment.status = status;
        if completed_now {
            enrollment.completed_at = Some(Utc::now());
        }

        Ok(Some(CourseProgressUpdate {
            enrollment: enrollment.clone(),
            computed,
            completed_now,
        }))
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn find_progress(&self, user_id: Uuid, lesson_id: Uuid) -> AppResult<Option<Progress>> {
        let t = self.tables.lock().await;
        Ok(t.progress
            .iter()
            .find(|p| p.user_id == user_id && p.lesson_id == lesson_id)
            .cloned())
    }

    async fn upsert_progress(
        &self,
        user_id: Uuid,
        lesson_id: Uuid,
        patch: ProgressPatch,
    ) -> AppResult<Progress> {
        let mut t = self.tables.lock().await;
        let now = Utc::now();
        if let Some(existing) = t
            .progress
            .iter_mut()
            .find(|p| p.user_id == user_id && p.lesson_id == lesson_id)
        {
            patch.apply(existing, now);
            return Ok(existing.clone());
        }
        let row = patch.create(user_id, lesson_id, now);
        t.progress.push(row.clone());
        Ok(row)
    }

    async fn progress_for_lessons(
        &self,
        user_id: Uuid,
        lesson_ids: &[Uuid],
    ) -> AppResult<Vec<Progress>> {
        let t = self.tables.lock().await;
        Ok(t.progress
            .iter()
            .filter(|p| p.user_id == user_id && lesson_ids.contains(&p.lesson_id))
            .cloned()
            .collect())
    }

    async fn count_completed_in_course(&self, user_id: Uuid, course_id: Uuid) -> AppResult<i64> {
        Ok(self
            .tables
            .lock()
            .await
            .count_completed_in_course(user_id, course_id))
    }

    async fn count_completed(&self, user_id: Uuid) -> AppResult<i64> {
        let t = self.tables.lock().await;
        Ok(t.progress
            .iter()
            .filter(|p| p.user_id == user_id && p.completed)
            .count() as i64)
    }

    async fn total_watch_time(&self, user_id: Uuid) -> AppResult<i64> {
        let t = self.tables.lock().await;
        Ok(t.progress
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| i64::from(p.watch_time))
            .sum())
    }

    async fn recent_completions(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<RecentCompletion>> {
        let t = self.tables.lock().await;
        let mut rows: Vec<RecentCompletion> = t
            .progress
            .iter()
            .filter(|p| p.user_id == user_id && p.completed)
            .filter_map(|p| {
                let completed_at = p.completed_at?;
                let lesson = t.lessons.iter().find(|l| l.id == p.lesson_id)?;
                let module = t.module(lesson.module_id)?;
                let course = t.courses.iter().find(|c| c.id == module.course_id)?;
                Some(RecentCompletion {
                    lesson_id: lesson.id,
                    lesson_title: lesson.title.clone(),
                    module_title: module.title.clone(),
                    course_id: course.id,
                    course_title: course.title.clone(),
                    course_thumbnail: course.thumbnail.clone(),
                    completed_at,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn append(&self, activity: NewActivity) -> AppResult<Activity> {
        let row = activity.into_activity(Utc::now());
        self.tables.lock().await.activities.push(row.clone());
        Ok(row)
    }

    async fn recent(
        &self,
        user_id: Uuid,
        types: &[ActivityType],
        limit: i64,
    ) -> AppResult<Vec<Activity>> {
        let t = self.tables.lock().await;
        let mut rows: Vec<Activity> = t
            .activities
            .iter()
            .filter(|a| a.user_id == user_id && types.contains(&a.activity_type))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn lesson_completion_times(&self, user_id: Uuid) -> AppResult<Vec<DateTime<Utc>>> {
        let t = self.tables.lock().await;
        let mut times: Vec<DateTime<Utc>> = t
            .activities
            .iter()
            .filter(|a| a.user_id == user_id && a.activity_type == ActivityType::LessonComplete)
            .map(|a| a.created_at)
            .collect();
        times.sort_by(|a, b| b.cmp(a));
        Ok(times)
    }
}

#[async_trait]
impl AchievementStore for MemoryStore {
    async fn grant_if_absent(&self, user_id: Uuid, name: &str) -> AppResult<GrantOutcome> {
        let mut t = self.tables.lock().await;
        let Some(achievement_id) = t.achievements.iter().find(|a| a.name == name).map(|a| a.id)
        else {
            return Ok(GrantOutcome::UnknownAchievement);
        };
        if t.user_achievements
            .iter()
            .any(|g| g.user_id == user_id && g.achievement_id == achievement_id)
        {
            return Ok(GrantOutcome::AlreadyHeld);
        }
        t.user_achievements.push(UserAchievement {
            id: Uuid::new_v4(),
            user_id,
            achievement_id,
            earned_at: Utc::now(),
        });
        Ok(GrantOutcome::Granted)
    }

    async fn earned(&self, user_id: Uuid) -> AppResult<Vec<EarnedAchievement>> {
        let t = self.tables.lock().await;
        let mut earned: Vec<EarnedAchievement> = t
            .user_achievements
            .iter()
            .filter(|g| g.user_id == user_id)
            .filter_map(|g| {
                t.achievements
                    .iter()
                    .find(|a| a.id == g.achievement_id)
                    .map(|a| EarnedAchievement {
                        achievement: a.clone(),
                        earned_at: g.earned_at,
                    })
            })
            .collect();
        earned.sort_by(|a, b| b.earned_at.cmp(&a.earned_at));
        Ok(earned)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> AppResult<Notification> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(AppError::database("Notification store unavailable"));
        }
        let row = notification.into_notification(Utc::now());
        self.tables.lock().await.notifications.push(row.clone());
        Ok(row)
    }
}
