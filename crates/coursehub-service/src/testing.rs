//! Fixtures shared by the service tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use coursehub_core::config::AppSettings;
use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_core::traits::{EmailMessage, EventPublisher, Mailer};
use coursehub_core::types::id::UserId;
use coursehub_database::memory::MemoryStore;
use coursehub_database::store::Stores;
use coursehub_entity::achievement::COURSE_COMPLETER;
use coursehub_entity::course::{Course, CourseStatus};
use coursehub_entity::lesson::Lesson;
use coursehub_entity::user::User;

use crate::context::RequestContext;
use crate::enrollment::EnrollmentService;
use crate::progress::ProgressService;

/// Captures published events.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    pub events: Mutex<Vec<(UserId, String, serde_json::Value)>>,
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(
        &self,
        user_id: UserId,
        event: &str,
        payload: serde_json::Value,
    ) -> AppResult<()> {
        self.events
            .lock()
            .await
            .push((user_id, event.to_string(), payload));
        Ok(())
    }
}

/// Captures sent mail; can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::external("SMTP relay unavailable"));
        }
        self.sent.lock().await.push(message);
        Ok(())
    }
}

/// A user, a published course with two published lessons and one draft
/// lesson, and both services wired over one memory store.
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub publisher: Arc<RecordingPublisher>,
    pub mailer: Arc<RecordingMailer>,
    pub progress: ProgressService,
    pub enrollments: EnrollmentService,
    pub user: User,
    pub ctx: RequestContext,
    pub course: Course,
    pub lesson_a: Lesson,
    pub lesson_b: Lesson,
    pub draft: Lesson,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        store.add_achievement(COURSE_COMPLETER).await;

        let user = store.add_user("ada@example.com", "Ada").await;
        let course = store.add_course("Rust 101", CourseStatus::Published).await;
        let intro = store.add_module(course.id, "Intro", 1).await;
        let lesson_a = store.add_lesson(intro.id, "Hello", 1, true).await;
        let lesson_b = store.add_lesson(intro.id, "Ownership", 2, true).await;
        let draft = store.add_lesson(intro.id, "Unsafe", 3, false).await;

        let publisher = Arc::new(RecordingPublisher::default());
        let mailer = Arc::new(RecordingMailer::default());
        let stores = Stores::memory(store.clone());
        let app = AppSettings {
            public_url: "https://learn.example.com".to_string(),
            ..AppSettings::default()
        };

        Self {
            progress: ProgressService::new(
                stores.clone(),
                publisher.clone(),
                mailer.clone(),
                app,
            ),
            enrollments: EnrollmentService::new(stores, mailer.clone()),
            ctx: RequestContext::new(UserId(user.id), user.email.clone()),
            store,
            publisher,
            mailer,
            user,
            course,
            lesson_a,
            lesson_b,
            draft,
        }
    }

    pub fn uid(&self) -> uuid::Uuid {
        self.user.id
    }
}
