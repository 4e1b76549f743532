//! Lesson progress workflow and the progress readers.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use coursehub_core::config::AppSettings;
use coursehub_core::error::AppError;
use coursehub_core::events::ProgressUpdated;
use coursehub_core::result::AppResult;
use coursehub_core::traits::publisher::publish_event;
use coursehub_core::traits::{EventPublisher, Mailer};
use coursehub_core::types::id::{CourseId, LessonId};
use coursehub_database::store::{CourseProgressUpdate, GrantOutcome, Stores};
use coursehub_entity::achievement::COURSE_COMPLETER;
use coursehub_entity::activity::{ActivityType, NewActivity};
use coursehub_entity::enrollment::EnrollmentStatus;
use coursehub_entity::lesson::LessonContext;
use coursehub_entity::notification::{NewNotification, NotificationType};
use coursehub_entity::progress::{Progress, ProgressPatch, completion_percentage};

use super::streak::learning_streak;
use super::views::{
    CourseProgress, EnrollmentOverview, LessonProgressItem, ModuleProgress, OverallProgress,
};
use crate::context::RequestContext;
use crate::effects::swallow;
use crate::mail::templates;

/// How many completed lessons the dashboard lists.
const RECENT_PROGRESS_LIMIT: i64 = 10;

/// Records lesson progress and reconciles course completion.
#[derive(Clone)]
pub struct ProgressService {
    stores: Stores,
    publisher: Arc<dyn EventPublisher>,
    mailer: Arc<dyn Mailer>,
    app: AppSettings,
}

impl std::fmt::Debug for ProgressService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressService").finish_non_exhaustive()
    }
}

impl ProgressService {
    /// Creates a new progress service.
    pub fn new(
        stores: Stores,
        publisher: Arc<dyn EventPublisher>,
        mailer: Arc<dyn Mailer>,
        app: AppSettings,
    ) -> Self {
        Self {
            stores,
            publisher,
            mailer,
            app,
        }
    }

    /// Apply one progress update for the caller on `lesson_id`.
    ///
    /// When the update marks the lesson completed, the course percentage is
    /// recomputed and, on the call that completes the course, the completion
    /// bundle runs. Failures after the progress write are logged only.
    pub async fn update_lesson_progress(
        &self,
        ctx: &RequestContext,
        lesson_id: LessonId,
        patch: ProgressPatch,
    ) -> AppResult<Progress> {
        if patch.watch_time.is_some_and(|w| w < 0) {
            return Err(AppError::validation("watchTime must be a non-negative integer"));
        }

        let lesson = self
            .stores
            .courses
            .find_lesson(lesson_id.into_uuid())
            .await?
            .ok_or_else(|| AppError::not_found("Lesson not found"))?;

        let user_id = ctx.uid();
        if self
            .stores
            .enrollments
            .find_enrollment(user_id, lesson.course_id)
            .await?
            .is_none()
        {
            return Err(AppError::forbidden("Not enrolled in this course"));
        }

        let progress = self
            .stores
            .progress
            .upsert_progress(user_id, lesson.lesson.id, patch)
            .await?;

        if patch.marks_completed() && progress.completed_at.is_some() {
            self.on_lesson_completed(ctx, &lesson).await?;
        }

        Ok(progress)
    }

    async fn on_lesson_completed(
        &self,
        ctx: &RequestContext,
        lesson: &LessonContext,
    ) -> AppResult<()> {
        let user_id = ctx.uid();

        self.stores
            .activities
            .append(NewActivity::new(
                user_id,
                ActivityType::LessonComplete,
                serde_json::json!({
                    "lessonId": lesson.lesson.id,
                    "lessonTitle": lesson.lesson.title,
                    "courseId": lesson.course_id,
                    "courseName": lesson.course_title,
                }),
            ))
            .await?;

        let Some(update) = self
            .stores
            .enrollments
            .record_course_progress(user_id, lesson.course_id)
            .await?
        else {
            warn!(
                user_id = %user_id,
                course_id = %lesson.course_id,
                "Enrollment vanished before progress could be recorded"
            );
            return Ok(());
        };

        debug!(
            user_id = %user_id,
            course_id = %lesson.course_id,
            computed = update.computed,
            stored = update.enrollment.progress,
            "Course progress recomputed"
        );

        if update.completed_now {
            self.on_course_completed(ctx, lesson, &update).await;
        }

        let event = ProgressUpdated {
            lesson_id: LessonId(lesson.lesson.id),
            course_id: CourseId(lesson.course_id),
            progress: update.enrollment.progress,
        };
        swallow(
            publish_event(self.publisher.as_ref(), ctx.user_id, &event).await,
            "realtime",
            user_id,
            lesson.course_id,
        );

        Ok(())
    }

    /// Completion bundle. Each step is independent of the others.
    async fn on_course_completed(
        &self,
        ctx: &RequestContext,
        lesson: &LessonContext,
        update: &CourseProgressUpdate,
    ) {
        let user_id = ctx.uid();
        let course_id = lesson.course_id;
        let course_title = &lesson.course_title;

        info!(user_id = %user_id, course_id = %course_id, "Course completed");

        swallow(
            self.stores
                .activities
                .append(NewActivity::new(
                    user_id,
                    ActivityType::CourseComplete,
                    serde_json::json!({ "courseId": course_id, "courseName": course_title }),
                ))
                .await,
            "activity",
            user_id,
            course_id,
        );

        match swallow(
            self.stores
                .achievements
                .grant_if_absent(user_id, COURSE_COMPLETER)
                .await,
            "achievement",
            user_id,
            course_id,
        ) {
            Some(GrantOutcome::Granted) => {
                info!(user_id = %user_id, achievement = COURSE_COMPLETER, "Achievement granted");
            }
            Some(GrantOutcome::AlreadyHeld) => {
                debug!(user_id = %user_id, achievement = COURSE_COMPLETER, "Achievement already held");
            }
            Some(GrantOutcome::UnknownAchievement) => {
                warn!(achievement = COURSE_COMPLETER, "Achievement template missing");
            }
            None => {}
        }

        swallow(
            self.stores
                .notifications
                .create_notification(NewNotification {
                    user_id,
                    title: "Course Completed!".to_string(),
                    message: format!("Congratulations! You've completed {course_title}"),
                    notification_type: NotificationType::Achievement,
                    link: Some(format!("/courses/{course_id}")),
                })
                .await,
            "notification",
            user_id,
            course_id,
        );

        let user = swallow(
            self.stores.users.find_user(user_id).await,
            "certificate email",
            user_id,
            course_id,
        )
        .flatten();
        if let Some(user) = user {
            let url = self
                .app
                .certificate_url(&update.enrollment.id.to_string());
            swallow(
                self.mailer
                    .send(templates::certificate(&user, course_title, &url))
                    .await,
                "certificate email",
                user_id,
                course_id,
            );
        }
    }

    /// The caller's progress on one lesson, if recorded.
    pub async fn lesson_progress(
        &self,
        ctx: &RequestContext,
        lesson_id: LessonId,
    ) -> AppResult<Option<Progress>> {
        self.stores
            .progress
            .find_progress(ctx.uid(), lesson_id.into_uuid())
            .await
    }

    /// Module-by-module breakdown of the caller's progress through a course.
    pub async fn course_progress(
        &self,
        ctx: &RequestContext,
        course_id: CourseId,
    ) -> AppResult<CourseProgress> {
        let course_id = course_id.into_uuid();
        if self.stores.courses.find_course(course_id).await?.is_none() {
            return Err(AppError::not_found("Course not found"));
        }

        let modules = self.stores.courses.modules(course_id).await?;
        let lessons = self.stores.courses.published_lessons(course_id).await?;
        let lesson_ids: Vec<Uuid> = lessons.iter().map(|l| l.id).collect();
        let records = self
            .stores
            .progress
            .progress_for_lessons(ctx.uid(), &lesson_ids)
            .await?;

        let completed_lessons = records.iter().filter(|p| p.completed).count() as i64;
        let total_watch_time = records.iter().map(|p| i64::from(p.watch_time)).sum();
        let total_lessons = lessons.len() as i64;

        let mut by_lesson: HashMap<Uuid, Progress> =
            records.into_iter().map(|p| (p.lesson_id, p)).collect();

        let mut breakdown: Vec<ModuleProgress> = modules.iter().map(ModuleProgress::new).collect();
        for lesson in &lessons {
            if let Some(module) = breakdown.iter_mut().find(|m| m.module_id == lesson.module_id) {
                let progress = by_lesson.remove(&lesson.id);
                module.lessons.push(LessonProgressItem::new(lesson, progress));
            }
        }
        breakdown.retain(|m| !m.lessons.is_empty());

        Ok(CourseProgress {
            course_id,
            total_lessons,
            completed_lessons,
            progress_percentage: completion_percentage(completed_lessons, total_lessons),
            total_watch_time,
            modules: breakdown,
        })
    }

    /// Cross-course summary for the caller.
    pub async fn overall_progress(&self, ctx: &RequestContext) -> AppResult<OverallProgress> {
        let user_id = ctx.uid();

        let summaries = self.stores.enrollments.summaries_for_user(user_id).await?;
        let total_completed_lessons = self.stores.progress.count_completed(user_id).await?;
        let total_watch_time = self.stores.progress.total_watch_time(user_id).await?;
        let recent_progress = self
            .stores
            .progress
            .recent_completions(user_id, RECENT_PROGRESS_LIMIT)
            .await?;
        let completions = self
            .stores
            .activities
            .lesson_completion_times(user_id)
            .await?;

        let count = |status: EnrollmentStatus| {
            summaries.iter().filter(|s| s.status == status).count() as i64
        };

        Ok(OverallProgress {
            total_enrollments: summaries.len() as i64,
            active_enrollments: count(EnrollmentStatus::Active),
            completed_courses: count(EnrollmentStatus::Completed),
            total_completed_lessons,
            total_watch_time,
            learning_streak: learning_streak(&completions, Utc::now().date_naive()),
            recent_progress,
            enrollments: summaries
                .into_iter()
                .map(|s| EnrollmentOverview {
                    course_id: s.course_id,
                    course_title: s.course_title,
                    course_thumbnail: s.course_thumbnail,
                    progress: s.progress,
                    status: s.status,
                    enrolled_at: s.enrolled_at,
                })
                .collect(),
        })
    }
}
