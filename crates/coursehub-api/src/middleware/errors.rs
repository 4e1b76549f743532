//! Hides server error messages from clients in production.

use axum::Json;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use coursehub_core::types::response::ApiErrorResponse;

use crate::error::ServerErrorMarker;
use crate::state::AppState;

/// Message returned in place of internal error text.
pub const GENERIC_SERVER_ERROR: &str = "Internal server error";

/// Replaces the body of marked 5xx responses when running in production.
pub async fn mask_server_errors(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !state.config.app.is_production()
        || response.extensions().get::<ServerErrorMarker>().is_none()
    {
        return response;
    }

    let status = response.status();
    (
        status,
        Json(ApiErrorResponse::new("INTERNAL", GENERIC_SERVER_ERROR)),
    )
        .into_response()
}
