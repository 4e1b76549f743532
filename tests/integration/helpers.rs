//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use coursehub_api::{AppState, build_app};
use coursehub_auth::jwt::JwtEncoder;
use coursehub_core::config::AppConfig;
use coursehub_core::types::id::UserId;
use coursehub_database::Stores;
use coursehub_database::memory::MemoryStore;
use coursehub_entity::achievement::COURSE_COMPLETER;
use coursehub_entity::course::{Course, CourseStatus};
use coursehub_entity::lesson::Lesson;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for reaching the realtime engine directly
    pub state: AppState,
    /// In-memory backing store for seeding and inspection
    pub store: Arc<MemoryStore>,
    /// Application config
    pub config: AppConfig,
    encoder: JwtEncoder,
}

/// A seeded learner with a valid bearer token.
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

/// A published course with a single module of published lessons.
pub struct TestCourse {
    pub course: Course,
    pub lessons: Vec<Lesson>,
}

impl TestApp {
    /// Create a new test application in the development environment
    pub async fn new() -> Self {
        Self::with_environment("development").await
    }

    /// Create a new test application with `app.environment` overridden
    pub async fn with_environment(environment: &str) -> Self {
        Self::with_config(|config| config.app.environment = environment.to_string()).await
    }

    /// Create a new test application, letting `configure` adjust the
    /// development config before the app is built
    pub async fn with_config(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::for_database("postgres://unused/coursehub_test");
        config.app.environment = "development".to_string();
        config.app.public_url = "https://learn.example.com".to_string();
        config.auth.jwt_secret = "integration-test-secret".to_string();
        config.email.enabled = false;
        configure(&mut config);

        let store = Arc::new(MemoryStore::new());
        store.add_achievement(COURSE_COMPLETER).await;

        let state = AppState::new(config.clone(), Stores::memory(store.clone()), None);
        let router = build_app(state.clone());

        Self {
            router,
            state,
            store,
            encoder: JwtEncoder::new(&config.auth),
            config,
        }
    }

    /// Insert a user and mint an access token for it
    pub async fn create_test_user(&self, email: &str, first_name: &str) -> TestUser {
        let user = self.store.add_user(email, first_name).await;
        let token = self
            .encoder
            .access_token(UserId(user.id), &user.email)
            .expect("Failed to mint token");
        TestUser { id: user.id, token }
    }

    /// Insert a published course with `lesson_count` published lessons
    pub async fn create_test_course(&self, title: &str, lesson_count: usize) -> TestCourse {
        let course = self.store.add_course(title, CourseStatus::Published).await;
        let module = self.store.add_module(course.id, "Module 1", 1).await;
        let mut lessons = Vec::with_capacity(lesson_count);
        for i in 0..lesson_count {
            let lesson = self
                .store
                .add_lesson(module.id, &format!("Lesson {}", i + 1), i as i32 + 1, true)
                .await;
            lessons.push(lesson);
        }
        TestCourse { course, lessons }
    }

    /// Enroll `user` through the API, asserting success
    pub async fn enroll(&self, user: &TestUser, course_id: Uuid) -> Uuid {
        let response = self
            .request(
                "POST",
                "/api/enrollments",
                Some(serde_json::json!({ "courseId": course_id })),
                Some(&user.token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        Uuid::parse_str(
            response.body["data"]["enrollment"]["id"]
                .as_str()
                .expect("enrollment id"),
        )
        .expect("uuid")
    }

    /// Mark a lesson completed through the API, asserting success
    pub async fn complete_lesson(&self, user: &TestUser, lesson_id: Uuid) -> TestResponse {
        let response = self
            .request(
                "POST",
                &format!("/api/progress/lesson/{lesson_id}"),
                Some(serde_json::json!({ "completed": true })),
                Some(&user.token),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let req = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("Failed to build request"),
            None => builder.body(Body::empty()).expect("Failed to build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Test response wrapper
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body as JSON
    pub body: Value,
}
