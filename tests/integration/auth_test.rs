//! Integration tests for bearer authentication, health, and error masking.

mod helpers;

use axum::http::StatusCode;

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request("GET", "/api/progress/overall", None, None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "AUTHENTICATION");
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "GET",
            "/api/enrollments/stats",
            None,
            Some("not-a-jwt"),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_check_without_auth() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["database"], "memory");
    assert_eq!(response.body["data"]["wsConnections"], 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;

    let response = app
        .request(
            "POST",
            "/api/enrollments",
            Some(serde_json::json!({ "courseId": "not-a-uuid" })),
            Some(&user.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_client_errors_keep_their_message_in_production() {
    let app = helpers::TestApp::with_environment("production").await;
    let user = app.create_test_user("ada@example.com", "Ada").await;

    let response = app
        .request(
            "GET",
            &format!("/api/progress/course/{}", uuid::Uuid::new_v4()),
            None,
            Some(&user.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Course not found");
}
