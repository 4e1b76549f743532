//! Route definitions for the CourseHub HTTP API.
//!
//! REST routes are mounted under `/api`; the WebSocket upgrade lives at
//! `/ws` outside the prefix.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Largest JSON body any endpoint accepts.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the router with every route bound to `state`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(progress_routes())
        .merge(enrollment_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Lesson progress: update, per-lesson, per-course, overall
fn progress_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/progress/lesson/{lesson_id}",
            post(handlers::progress::update_lesson_progress)
                .get(handlers::progress::get_lesson_progress),
        )
        .route(
            "/progress/course/{course_id}",
            get(handlers::progress::get_course_progress),
        )
        .route(
            "/progress/overall",
            get(handlers::progress::get_overall_progress),
        )
}

/// Enrollment lifecycle and listings
fn enrollment_routes() -> Router<AppState> {
    Router::new()
        .route("/enrollments", post(handlers::enrollment::enroll))
        .route(
            "/enrollments/my-courses",
            get(handlers::enrollment::my_courses),
        )
        .route("/enrollments/stats", get(handlers::enrollment::stats))
        .route(
            "/enrollments/course/{course_id}",
            get(handlers::enrollment::get_enrollment),
        )
        .route(
            "/enrollments/{id}",
            delete(handlers::enrollment::drop_enrollment),
        )
}

/// Liveness probe (no auth)
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
