//! Query parameters for the enrollment list.

use serde::Deserialize;

use coursehub_core::error::AppError;
use coursehub_core::types::pagination::{DEFAULT_PAGE_SIZE, PageRequest};
use coursehub_entity::enrollment::EnrollmentStatus;

/// `?page&limit&status` for `GET /api/enrollments/my-courses`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollmentListParams {
    /// Page number (1-based, default: 1).
    pub page: Option<u64>,
    /// Items per page (default: 20, max: 100).
    pub limit: Option<u64>,
    /// Optional status filter.
    pub status: Option<String>,
}

impl EnrollmentListParams {
    /// Converts to a `PageRequest`.
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    /// Parses the status filter. An empty value means no filter.
    pub fn status(&self) -> Result<Option<EnrollmentStatus>, AppError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }
}
