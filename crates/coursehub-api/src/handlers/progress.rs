//! Lesson progress handlers.

use axum::Json;
use axum::extract::State;

use coursehub_core::types::id::{CourseId, LessonId};
use coursehub_service::progress::{CourseProgress, OverallProgress};

use crate::dto::request::UpdateProgressRequest;
use crate::dto::response::{ApiResponse, ProgressResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson, ValidatedPath};
use crate::state::AppState;

/// POST /api/progress/lesson/{lessonId}
pub async fn update_lesson_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(lesson_id): ValidatedPath<LessonId>,
    ValidatedJson(req): ValidatedJson<UpdateProgressRequest>,
) -> Result<Json<ApiResponse<ProgressResponse>>, ApiError> {
    let progress = state
        .progress_service
        .update_lesson_progress(&auth, lesson_id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(ProgressResponse {
        progress: Some(progress),
    })))
}

/// GET /api/progress/lesson/{lessonId}
pub async fn get_lesson_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(lesson_id): ValidatedPath<LessonId>,
) -> Result<Json<ApiResponse<ProgressResponse>>, ApiError> {
    let progress = state
        .progress_service
        .lesson_progress(&auth, lesson_id)
        .await?;
    Ok(Json(ApiResponse::ok(ProgressResponse { progress })))
}

/// GET /api/progress/course/{courseId}
pub async fn get_course_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(course_id): ValidatedPath<CourseId>,
) -> Result<Json<ApiResponse<CourseProgress>>, ApiError> {
    let view = state
        .progress_service
        .course_progress(&auth, course_id)
        .await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// GET /api/progress/overall
pub async fn get_overall_progress(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<OverallProgress>>, ApiError> {
    let view = state.progress_service.overall_progress(&auth).await?;
    Ok(Json(ApiResponse::ok(view)))
}
