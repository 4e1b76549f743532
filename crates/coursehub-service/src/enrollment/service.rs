//! Enrollment service.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_core::traits::Mailer;
use coursehub_core::types::id::{CourseId, EnrollmentId};
use coursehub_core::types::pagination::{PageRequest, PageResponse};
use coursehub_database::store::Stores;
use coursehub_entity::activity::{ActivityType, NewActivity};
use coursehub_entity::course::Course;
use coursehub_entity::enrollment::{Enrollment, EnrollmentStatus};
use coursehub_entity::notification::{NewNotification, NotificationType};
use coursehub_entity::progress::{Progress, completion_percentage};

use super::views::{CourseOutline, EnrollmentDetail, EnrollmentStats, ModuleOutline, MyCourse};
use crate::context::RequestContext;
use crate::effects::swallow;
use crate::mail::templates;
use crate::progress::LessonProgressItem;

/// How many activity entries the stats view lists.
const RECENT_ACTIVITY_LIMIT: i64 = 10;

/// Manages a user's enrollments.
#[derive(Clone)]
pub struct EnrollmentService {
    stores: Stores,
    mailer: Arc<dyn Mailer>,
}

impl std::fmt::Debug for EnrollmentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrollmentService").finish_non_exhaustive()
    }
}

impl EnrollmentService {
    /// Creates a new enrollment service.
    pub fn new(stores: Stores, mailer: Arc<dyn Mailer>) -> Self {
        Self { stores, mailer }
    }

    /// Enrolls the caller in a published course whose prerequisites they
    /// have completed.
    pub async fn enroll(&self, ctx: &RequestContext, course_id: CourseId) -> AppResult<Enrollment> {
        let user_id = ctx.uid();
        let course = self
            .stores
            .courses
            .find_course(course_id.into_uuid())
            .await?
            .ok_or_else(|| AppError::not_found("Course not found"))?;

        if !course.is_published() {
            return Err(AppError::validation("Course is not available for enrollment"));
        }

        if self
            .stores
            .enrollments
            .find_enrollment(user_id, course.id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Already enrolled in this course"));
        }

        self.check_prerequisites(user_id, &course).await?;

        let enrollment = self
            .stores
            .enrollments
            .create_enrollment(&Enrollment::new_active(user_id, course.id))
            .await?;

        info!(
            user_id = %user_id,
            course_id = %course.id,
            enrollment_id = %enrollment.id,
            "User enrolled"
        );

        self.on_enrolled(user_id, &course).await;
        Ok(enrollment)
    }

    async fn check_prerequisites(&self, user_id: Uuid, course: &Course) -> AppResult<()> {
        let required: Vec<Uuid> = self
            .stores
            .courses
            .prerequisites(course.id)
            .await?
            .into_iter()
            .map(|p| p.prerequisite_id)
            .collect();
        if required.is_empty() {
            return Ok(());
        }

        let completed = self
            .stores
            .enrollments
            .completed_course_ids(user_id, &required)
            .await?;
        if required.iter().all(|id| completed.contains(id)) {
            Ok(())
        } else {
            Err(AppError::validation("Prerequisites not completed")
                .with_details(serde_json::json!({ "required": required })))
        }
    }

    async fn on_enrolled(&self, user_id: Uuid, course: &Course) {
        swallow(
            self.stores
                .activities
                .append(NewActivity::new(
                    user_id,
                    ActivityType::CourseEnrolled,
                    serde_json::json!({ "courseId": course.id, "courseName": course.title }),
                ))
                .await,
            "activity",
            user_id,
            course.id,
        );

        swallow(
            self.stores
                .notifications
                .create_notification(NewNotification {
                    user_id,
                    title: "Enrollment Successful".to_string(),
                    message: format!("You have successfully enrolled in {}", course.title),
                    notification_type: NotificationType::Enrollment,
                    link: Some(format!("/courses/{}", course.id)),
                })
                .await,
            "notification",
            user_id,
            course.id,
        );

        let user = swallow(
            self.stores.users.find_user(user_id).await,
            "enrollment email",
            user_id,
            course.id,
        )
        .flatten();
        if let Some(user) = user {
            swallow(
                self.mailer
                    .send(templates::enrollment(&user, &course.title))
                    .await,
                "enrollment email",
                user_id,
                course.id,
            );
        }
    }

    /// One page of the caller's enrollments, newest first.
    pub async fn my_enrollments(
        &self,
        ctx: &RequestContext,
        status: Option<EnrollmentStatus>,
        page: PageRequest,
    ) -> AppResult<PageResponse<MyCourse>> {
        let user_id = ctx.uid();
        let (enrollments, total) = self
            .stores
            .enrollments
            .list_for_user(user_id, status, page)
            .await?;

        let mut items = Vec::with_capacity(enrollments.len());
        for enrollment in enrollments {
            let course = self.stores.courses.find_course(enrollment.course_id).await?;
            let total_lessons = self
                .stores
                .courses
                .count_published_lessons(enrollment.course_id)
                .await?;
            let completed_lessons = self
                .stores
                .progress
                .count_completed_in_course(user_id, enrollment.course_id)
                .await?;
            items.push(MyCourse {
                enrollment,
                course,
                total_lessons,
                completed_lessons,
                progress_percentage: completion_percentage(completed_lessons, total_lessons),
            });
        }

        Ok(PageResponse::new(items, page, total))
    }

    /// The caller's enrollment in a course with the course outline.
    pub async fn enrollment_detail(
        &self,
        ctx: &RequestContext,
        course_id: CourseId,
    ) -> AppResult<EnrollmentDetail> {
        let user_id = ctx.uid();
        let course_id = course_id.into_uuid();

        let enrollment = self
            .stores
            .enrollments
            .find_enrollment(user_id, course_id)
            .await?
            .ok_or_else(|| AppError::not_found("Enrollment not found"))?;
        let course = self
            .stores
            .courses
            .find_course(course_id)
            .await?
            .ok_or_else(|| AppError::not_found("Course not found"))?;

        let modules = self.stores.courses.modules(course_id).await?;
        let lessons = self.stores.courses.published_lessons(course_id).await?;
        let lesson_ids: Vec<Uuid> = lessons.iter().map(|l| l.id).collect();
        let mut by_lesson: HashMap<Uuid, Progress> = self
            .stores
            .progress
            .progress_for_lessons(user_id, &lesson_ids)
            .await?
            .into_iter()
            .map(|p| (p.lesson_id, p))
            .collect();

        let modules = modules
            .into_iter()
            .map(|module| {
                let lessons = lessons
                    .iter()
                    .filter(|l| l.module_id == module.id)
                    .map(|l| LessonProgressItem::new(l, by_lesson.remove(&l.id)))
                    .collect();
                ModuleOutline { module, lessons }
            })
            .collect();

        Ok(EnrollmentDetail {
            enrollment,
            course: CourseOutline { course, modules },
        })
    }

    /// Drops one of the caller's enrollments.
    pub async fn drop_enrollment(
        &self,
        ctx: &RequestContext,
        enrollment_id: EnrollmentId,
    ) -> AppResult<Enrollment> {
        let user_id = ctx.uid();
        let enrollment = self
            .stores
            .enrollments
            .find_enrollment_by_id(enrollment_id.into_uuid())
            .await?
            .ok_or_else(|| AppError::not_found("Enrollment not found"))?;

        if !enrollment.is_owned_by(user_id) {
            return Err(AppError::forbidden("Not authorized to drop this enrollment"));
        }

        match enrollment.status {
            EnrollmentStatus::Completed => {
                Err(AppError::validation("Cannot drop a completed course"))
            }
            EnrollmentStatus::Dropped => Ok(enrollment),
            EnrollmentStatus::Active => {
                let Some(dropped) = self
                    .stores
                    .enrollments
                    .drop_if_active(enrollment.id)
                    .await?
                else {
                    // The row left ACTIVE between the read and the write.
                    return self.settled_drop(enrollment.id).await;
                };

                info!(
                    user_id = %user_id,
                    course_id = %dropped.course_id,
                    enrollment_id = %dropped.id,
                    "Enrollment dropped"
                );

                swallow(
                    self.stores
                        .activities
                        .append(NewActivity::new(
                            user_id,
                            ActivityType::CourseDropped,
                            serde_json::json!({ "courseId": dropped.course_id }),
                        ))
                        .await,
                    "activity",
                    user_id,
                    dropped.course_id,
                );

                Ok(dropped)
            }
        }
    }

    async fn settled_drop(&self, enrollment_id: Uuid) -> AppResult<Enrollment> {
        let current = self
            .stores
            .enrollments
            .find_enrollment_by_id(enrollment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Enrollment not found"))?;
        match current.status {
            EnrollmentStatus::Dropped => Ok(current),
            _ => Err(AppError::validation("Cannot drop a completed course")),
        }
    }

    /// Enrollment counts, recent activity and earned achievements.
    pub async fn stats(&self, ctx: &RequestContext) -> AppResult<EnrollmentStats> {
        let user_id = ctx.uid();
        let stats = self.stores.enrollments.counts_for_user(user_id).await?;
        let recent_activity = self
            .stores
            .activities
            .recent(user_id, ActivityType::dashboard_feed(), RECENT_ACTIVITY_LIMIT)
            .await?;
        let achievements = self.stores.achievements.earned(user_id).await?;

        Ok(EnrollmentStats {
            stats,
            recent_activity,
            achievements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursehub_core::error::ErrorKind;
    use coursehub_core::types::id::LessonId;
    use coursehub_database::store::{CourseProgressUpdate, EnrollmentStore};
    use coursehub_entity::course::CourseStatus;
    use coursehub_entity::enrollment::{EnrollmentCounts, EnrollmentSummary};
    use coursehub_entity::progress::ProgressPatch;

    use crate::testing::Fixture;

    #[tokio::test]
    async fn test_enroll_creates_active_enrollment_with_side_effects() {
        let fx = Fixture::new().await;
        let enrollment = fx
            .enrollments
            .enroll(&fx.ctx, CourseId(fx.course.id))
            .await
            .unwrap();

        assert_eq!(enrollment.status, EnrollmentStatus::Active);
        assert_eq!(enrollment.progress, 0);
        assert!(enrollment.completed_at.is_none());

        let activities = fx
            .store
            .activities_of(fx.uid(), ActivityType::CourseEnrolled)
            .await;
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].metadata["courseName"], "Rust 101");

        let notifications = fx.store.notifications_of(fx.uid()).await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].title, "Enrollment Successful");
        assert_eq!(
            notifications[0].link.as_deref(),
            Some(format!("/courses/{}", fx.course.id).as_str())
        );

        let sent = fx.mailer.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "You're enrolled in Rust 101!");
    }

    #[tokio::test]
    async fn test_double_enrollment_conflicts() {
        let fx = Fixture::new().await;
        let course = CourseId(fx.course.id);
        fx.enrollments.enroll(&fx.ctx, course).await.unwrap();
        let err = fx.enrollments.enroll(&fx.ctx, course).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(fx.store.enrollment_rows(fx.uid(), fx.course.id).await, 1);
    }

    #[tokio::test]
    async fn test_unpublished_course_rejected() {
        let fx = Fixture::new().await;
        let draft = fx.store.add_course("Draft", CourseStatus::Draft).await;
        let err = fx
            .enrollments
            .enroll(&fx.ctx, CourseId(draft.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "Course is not available for enrollment");
    }

    #[tokio::test]
    async fn test_unknown_course_not_found() {
        let fx = Fixture::new().await;
        let err = fx
            .enrollments
            .enroll(&fx.ctx, CourseId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_prerequisites_must_be_completed() {
        let fx = Fixture::new().await;
        let advanced = fx
            .store
            .add_course("Rust 201", CourseStatus::Published)
            .await;
        fx.store.add_prerequisite(advanced.id, fx.course.id).await;

        let err = fx
            .enrollments
            .enroll(&fx.ctx, CourseId(advanced.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "Prerequisites not completed");

        fx.enrollments
            .enroll(&fx.ctx, CourseId(fx.course.id))
            .await
            .unwrap();
        for lesson in [fx.lesson_a.id, fx.lesson_b.id] {
            fx.progress
                .update_lesson_progress(
                    &fx.ctx,
                    LessonId(lesson),
                    ProgressPatch {
                        completed: Some(true),
                        watch_time: None,
                    },
                )
                .await
                .unwrap();
        }

        let enrollment = fx
            .enrollments
            .enroll(&fx.ctx, CourseId(advanced.id))
            .await
            .unwrap();
        assert_eq!(enrollment.course_id, advanced.id);
    }

    #[tokio::test]
    async fn test_drop_active_and_reject_completed() {
        let fx = Fixture::new().await;
        let enrollment = fx
            .enrollments
            .enroll(&fx.ctx, CourseId(fx.course.id))
            .await
            .unwrap();

        let dropped = fx
            .enrollments
            .drop_enrollment(&fx.ctx, EnrollmentId(enrollment.id))
            .await
            .unwrap();
        assert_eq!(dropped.status, EnrollmentStatus::Dropped);
        assert_eq!(
            fx.store
                .activities_of(fx.uid(), ActivityType::CourseDropped)
                .await
                .len(),
            1
        );

        let again = fx
            .enrollments
            .drop_enrollment(&fx.ctx, EnrollmentId(enrollment.id))
            .await
            .unwrap();
        assert_eq!(again.status, EnrollmentStatus::Dropped);
        assert_eq!(
            fx.store
                .activities_of(fx.uid(), ActivityType::CourseDropped)
                .await
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_completed_course_cannot_be_dropped() {
        let fx = Fixture::new().await;
        let enrollment = fx
            .enrollments
            .enroll(&fx.ctx, CourseId(fx.course.id))
            .await
            .unwrap();
        for lesson in [fx.lesson_a.id, fx.lesson_b.id] {
            fx.progress
                .update_lesson_progress(
                    &fx.ctx,
                    LessonId(lesson),
                    ProgressPatch {
                        completed: Some(true),
                        watch_time: None,
                    },
                )
                .await
                .unwrap();
        }

        let err = fx
            .enrollments
            .drop_enrollment(&fx.ctx, EnrollmentId(enrollment.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "Cannot drop a completed course");
    }

    #[tokio::test]
    async fn test_drop_someone_elses_enrollment_is_forbidden() {
        let fx = Fixture::new().await;
        let enrollment = fx
            .enrollments
            .enroll(&fx.ctx, CourseId(fx.course.id))
            .await
            .unwrap();
        let other = fx.store.add_user("grace@example.com", "Grace").await;
        let other_ctx = RequestContext::new(other.id.into(), other.email.clone());

        let err = fx
            .enrollments
            .drop_enrollment(&other_ctx, EnrollmentId(enrollment.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let missing = fx
            .enrollments
            .drop_enrollment(&fx.ctx, EnrollmentId::new())
            .await
            .unwrap_err();
        assert_eq!(missing.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_my_enrollments_counts_published_lessons() {
        let fx = Fixture::new().await;
        fx.enrollments
            .enroll(&fx.ctx, CourseId(fx.course.id))
            .await
            .unwrap();
        fx.progress
            .update_lesson_progress(
                &fx.ctx,
                LessonId(fx.lesson_a.id),
                ProgressPatch {
                    completed: Some(true),
                    watch_time: None,
                },
            )
            .await
            .unwrap();

        let page = fx
            .enrollments
            .my_enrollments(&fx.ctx, None, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.total_pages, 1);
        let item = &page.items[0];
        assert_eq!(item.total_lessons, 2);
        assert_eq!(item.completed_lessons, 1);
        assert_eq!(item.progress_percentage, 50);
        assert_eq!(item.course.as_ref().map(|c| c.title.as_str()), Some("Rust 101"));

        let completed = fx
            .enrollments
            .my_enrollments(&fx.ctx, Some(EnrollmentStatus::Completed), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(completed.total, 0);
        assert!(completed.items.is_empty());
    }

    #[tokio::test]
    async fn test_enrollment_detail_outline() {
        let fx = Fixture::new().await;
        let missing = fx
            .enrollments
            .enrollment_detail(&fx.ctx, CourseId(fx.course.id))
            .await
            .unwrap_err();
        assert_eq!(missing.kind, ErrorKind::NotFound);
        assert_eq!(missing.message, "Enrollment not found");

        fx.enrollments
            .enroll(&fx.ctx, CourseId(fx.course.id))
            .await
            .unwrap();
        let detail = fx
            .enrollments
            .enrollment_detail(&fx.ctx, CourseId(fx.course.id))
            .await
            .unwrap();
        assert_eq!(detail.course.course.id, fx.course.id);
        assert_eq!(detail.course.modules.len(), 1);
        let titles: Vec<&str> = detail.course.modules[0]
            .lessons
            .iter()
            .map(|l| l.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Hello", "Ownership"]);
    }

    #[tokio::test]
    async fn test_stats_counts_activity_and_achievements() {
        let fx = Fixture::new().await;
        fx.enrollments
            .enroll(&fx.ctx, CourseId(fx.course.id))
            .await
            .unwrap();
        for lesson in [fx.lesson_a.id, fx.lesson_b.id] {
            fx.progress
                .update_lesson_progress(
                    &fx.ctx,
                    LessonId(lesson),
                    ProgressPatch {
                        completed: Some(true),
                        watch_time: None,
                    },
                )
                .await
                .unwrap();
        }

        let stats = fx.enrollments.stats(&fx.ctx).await.unwrap();
        assert_eq!(stats.stats.total, 1);
        assert_eq!(stats.stats.completed, 1);
        assert_eq!(stats.stats.active, 0);
        assert_eq!(stats.stats.dropped, 0);
        // enrolled + two lessons + course complete
        assert_eq!(stats.recent_activity.len(), 4);
        assert_eq!(stats.achievements.len(), 1);
        assert_eq!(stats.achievements[0].achievement.name, "Course Completer");
    }

    /// Serves one stale snapshot from `find_enrollment_by_id`, then reads
    /// through to the memory store.
    struct StaleOnce {
        inner: Arc<coursehub_database::memory::MemoryStore>,
        snapshot: std::sync::Mutex<Option<Enrollment>>,
    }

    #[async_trait::async_trait]
    impl EnrollmentStore for StaleOnce {
        async fn find_enrollment(
            &self,
            user_id: Uuid,
            course_id: Uuid,
        ) -> AppResult<Option<Enrollment>> {
            self.inner.find_enrollment(user_id, course_id).await
        }

        async fn find_enrollment_by_id(&self, id: Uuid) -> AppResult<Option<Enrollment>> {
            let stale = self.snapshot.lock().unwrap().take();
            match stale {
                Some(snapshot) => Ok(Some(snapshot)),
                None => self.inner.find_enrollment_by_id(id).await,
            }
        }

        async fn create_enrollment(&self, enrollment: &Enrollment) -> AppResult<Enrollment> {
            self.inner.create_enrollment(enrollment).await
        }

        async fn drop_if_active(&self, id: Uuid) -> AppResult<Option<Enrollment>> {
            self.inner.drop_if_active(id).await
        }

        async fn list_for_user(
            &self,
            user_id: Uuid,
            status: Option<EnrollmentStatus>,
            page: PageRequest,
        ) -> AppResult<(Vec<Enrollment>, u64)> {
            self.inner.list_for_user(user_id, status, page).await
        }

        async fn summaries_for_user(&self, user_id: Uuid) -> AppResult<Vec<EnrollmentSummary>> {
            self.inner.summaries_for_user(user_id).await
        }

        async fn counts_for_user(&self, user_id: Uuid) -> AppResult<EnrollmentCounts> {
            self.inner.counts_for_user(user_id).await
        }

        async fn completed_course_ids(
            &self,
            user_id: Uuid,
            course_ids: &[Uuid],
        ) -> AppResult<Vec<Uuid>> {
            self.inner.completed_course_ids(user_id, course_ids).await
        }

        async fn record_course_progress(
            &self,
            user_id: Uuid,
            course_id: Uuid,
        ) -> AppResult<Option<CourseProgressUpdate>> {
            self.inner.record_course_progress(user_id, course_id).await
        }
    }

    #[tokio::test]
    async fn test_drop_racing_completion_keeps_course_completed() {
        let fx = Fixture::new().await;
        let enrollment = fx
            .enrollments
            .enroll(&fx.ctx, CourseId(fx.course.id))
            .await
            .unwrap();

        // The drop request reads the row while it is still ACTIVE...
        let stale = StaleOnce {
            inner: fx.store.clone(),
            snapshot: std::sync::Mutex::new(Some(enrollment.clone())),
        };
        // ...and the last lesson completes before its write lands.
        for lesson in [fx.lesson_a.id, fx.lesson_b.id] {
            fx.progress
                .update_lesson_progress(
                    &fx.ctx,
                    LessonId(lesson),
                    ProgressPatch {
                        completed: Some(true),
                        watch_time: None,
                    },
                )
                .await
                .unwrap();
        }

        let mut stores = Stores::memory(fx.store.clone());
        stores.enrollments = Arc::new(stale);
        let service = EnrollmentService::new(stores, fx.mailer.clone());

        let err = service
            .drop_enrollment(&fx.ctx, EnrollmentId(enrollment.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "Cannot drop a completed course");

        let row = fx
            .store
            .find_enrollment_by_id(enrollment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, EnrollmentStatus::Completed);
        assert_eq!(row.progress, 100);
        assert!(
            fx.store
                .activities_of(fx.uid(), ActivityType::CourseDropped)
                .await
                .is_empty()
        );
    }
}
