//! Response DTOs.

use serde::Serialize;

use coursehub_core::types::pagination::PageResponse;
use coursehub_entity::enrollment::Enrollment;
use coursehub_entity::progress::Progress;
use coursehub_service::enrollment::MyCourse;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
    /// Optional human-readable message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    /// Creates a successful response with a message.
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

/// `{ progress }`, where progress may be null.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressResponse {
    pub progress: Option<Progress>,
}

/// `{ enrollment }`.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentResponse<T: Serialize = Enrollment> {
    pub enrollment: T,
}

/// Pagination block of list responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// `{ enrollments, pagination }` for the "my courses" list.
#[derive(Debug, Clone, Serialize)]
pub struct MyCoursesResponse {
    pub enrollments: Vec<MyCourse>,
    pub pagination: Pagination,
}

impl From<PageResponse<MyCourse>> for MyCoursesResponse {
    fn from(page: PageResponse<MyCourse>) -> Self {
        Self {
            pagination: Pagination {
                page: page.page,
                limit: page.limit,
                total: page.total,
                total_pages: page.total_pages,
            },
            enrollments: page.items,
        }
    }
}

/// Health check body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// `connected`, `unavailable`, or `memory`.
    pub database: String,
    /// Open WebSocket connections.
    pub ws_connections: usize,
}
