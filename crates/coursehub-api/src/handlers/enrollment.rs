//! Enrollment handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use coursehub_core::types::id::{CourseId, EnrollmentId};
use coursehub_entity::enrollment::Enrollment;
use coursehub_service::enrollment::{EnrollmentDetail, EnrollmentStats};

use crate::dto::request::EnrollRequest;
use crate::dto::response::{ApiResponse, EnrollmentResponse, MyCoursesResponse};
use crate::error::ApiError;
use crate::extractors::{
    AuthUser, EnrollmentListParams, ValidatedJson, ValidatedPath, ValidatedQuery,
};
use crate::state::AppState;

/// POST /api/enrollments
pub async fn enroll(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<EnrollRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EnrollmentResponse>>), ApiError> {
    let enrollment = state
        .enrollment_service
        .enroll(&auth, CourseId(req.course_id))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            EnrollmentResponse { enrollment },
            "Successfully enrolled in course",
        )),
    ))
}

/// GET /api/enrollments/my-courses
pub async fn my_courses(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedQuery(params): ValidatedQuery<EnrollmentListParams>,
) -> Result<Json<ApiResponse<MyCoursesResponse>>, ApiError> {
    let status = params.status()?;
    let page = state
        .enrollment_service
        .my_enrollments(&auth, status, params.page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page.into())))
}

/// GET /api/enrollments/stats
pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<EnrollmentStats>>, ApiError> {
    let stats = state.enrollment_service.stats(&auth).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// GET /api/enrollments/course/{courseId}
pub async fn get_enrollment(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(course_id): ValidatedPath<CourseId>,
) -> Result<Json<ApiResponse<EnrollmentResponse<EnrollmentDetail>>>, ApiError> {
    let enrollment = state
        .enrollment_service
        .enrollment_detail(&auth, course_id)
        .await?;
    Ok(Json(ApiResponse::ok(EnrollmentResponse { enrollment })))
}

/// DELETE /api/enrollments/{id}
pub async fn drop_enrollment(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(enrollment_id): ValidatedPath<EnrollmentId>,
) -> Result<Json<ApiResponse<EnrollmentResponse<Enrollment>>>, ApiError> {
    let enrollment = state
        .enrollment_service
        .drop_enrollment(&auth, enrollment_id)
        .await?;
    Ok(Json(ApiResponse::with_message(
        EnrollmentResponse { enrollment },
        "Successfully dropped course",
    )))
}
