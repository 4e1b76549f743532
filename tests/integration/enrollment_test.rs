//! Integration tests for the enrollment endpoints.

mod helpers;

use axum::http::StatusCode;
use uuid::Uuid;

use coursehub_entity::course::CourseStatus;

#[tokio::test]
async fn test_enroll_success() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let course = app.create_test_course("Rust 101", 2).await;

    let response = app
        .request(
            "POST",
            "/api/enrollments",
            Some(serde_json::json!({ "courseId": course.course.id })),
            Some(&user.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let enrollment = &response.body["data"]["enrollment"];
    assert_eq!(enrollment["status"], "ACTIVE");
    assert_eq!(enrollment["progress"], 0);
    assert_eq!(
        app.store.enrollment_rows(user.id, course.course.id).await,
        1
    );
}

#[tokio::test]
async fn test_enroll_twice_conflicts() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let course = app.create_test_course("Rust 101", 1).await;
    app.enroll(&user, course.course.id).await;

    let response = app
        .request(
            "POST",
            "/api/enrollments",
            Some(serde_json::json!({ "courseId": course.course.id })),
            Some(&user.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(
        app.store.enrollment_rows(user.id, course.course.id).await,
        1
    );
}

#[tokio::test]
async fn test_enroll_in_unpublished_course() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let draft = app.store.add_course("Draft", CourseStatus::Draft).await;

    let response = app
        .request(
            "POST",
            "/api/enrollments",
            Some(serde_json::json!({ "courseId": draft.id })),
            Some(&user.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_enroll_unknown_course() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;

    let response = app
        .request(
            "POST",
            "/api/enrollments",
            Some(serde_json::json!({ "courseId": Uuid::new_v4() })),
            Some(&user.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_enroll_requires_prerequisites() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let basics = app.create_test_course("Basics", 1).await;
    let advanced = app.create_test_course("Advanced", 1).await;
    app.store
        .add_prerequisite(advanced.course.id, basics.course.id)
        .await;

    let response = app
        .request(
            "POST",
            "/api/enrollments",
            Some(serde_json::json!({ "courseId": advanced.course.id })),
            Some(&user.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Prerequisites not completed");

    app.enroll(&user, basics.course.id).await;
    app.complete_lesson(&user, basics.lessons[0].id).await;

    app.enroll(&user, advanced.course.id).await;
}

#[tokio::test]
async fn test_my_courses_filters_and_paginates() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let done = app.create_test_course("Done", 1).await;
    let open = app.create_test_course("Open", 2).await;
    app.enroll(&user, done.course.id).await;
    app.enroll(&user, open.course.id).await;
    app.complete_lesson(&user, done.lessons[0].id).await;

    let response = app
        .request(
            "GET",
            "/api/enrollments/my-courses?status=COMPLETED",
            None,
            Some(&user.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let enrollments = response.body["data"]["enrollments"]
        .as_array()
        .expect("enrollments array");
    assert_eq!(enrollments.len(), 1);
    assert_eq!(enrollments[0]["courseId"], done.course.id.to_string());
    assert_eq!(enrollments[0]["progressPercentage"], 100);

    let response = app
        .request(
            "GET",
            "/api/enrollments/my-courses?page=1&limit=1",
            None,
            Some(&user.token),
        )
        .await;
    let pagination = &response.body["data"]["pagination"];
    assert_eq!(pagination["total"], 2);
    assert_eq!(pagination["totalPages"], 2);
    assert_eq!(
        response.body["data"]["enrollments"].as_array().map(Vec::len),
        Some(1)
    );
}

#[tokio::test]
async fn test_my_courses_rejects_unknown_status() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;

    let response = app
        .request(
            "GET",
            "/api/enrollments/my-courses?status=PAUSED",
            None,
            Some(&user.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_drop_enrollment() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let course = app.create_test_course("Rust 101", 2).await;
    let enrollment_id = app.enroll(&user, course.course.id).await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/enrollments/{enrollment_id}"),
            None,
            Some(&user.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["enrollment"]["status"], "DROPPED");
}

#[tokio::test]
async fn test_drop_someone_elses_enrollment() {
    let app = helpers::TestApp::new().await;
    let owner = app.create_test_user("ada@example.com", "Ada").await;
    let other = app.create_test_user("bob@example.com", "Bob").await;
    let course = app.create_test_course("Rust 101", 1).await;
    let enrollment_id = app.enroll(&owner, course.course.id).await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/enrollments/{enrollment_id}"),
            None,
            Some(&other.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_drop_completed_enrollment_rejected() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let course = app.create_test_course("Rust 101", 1).await;
    let enrollment_id = app.enroll(&user, course.course.id).await;
    app.complete_lesson(&user, course.lessons[0].id).await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/enrollments/{enrollment_id}"),
            None,
            Some(&user.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Cannot drop a completed course");
}

#[tokio::test]
async fn test_enrollment_detail_not_enrolled() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let course = app.create_test_course("Rust 101", 1).await;

    let response = app
        .request(
            "GET",
            &format!("/api/enrollments/course/{}", course.course.id),
            None,
            Some(&user.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Enrollment not found");
}

#[tokio::test]
async fn test_stats_counts_by_status() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let done = app.create_test_course("Done", 1).await;
    let dropped = app.create_test_course("Dropped", 1).await;
    app.enroll(&user, done.course.id).await;
    let dropped_id = app.enroll(&user, dropped.course.id).await;
    app.complete_lesson(&user, done.lessons[0].id).await;
    app.request(
        "DELETE",
        &format!("/api/enrollments/{dropped_id}"),
        None,
        Some(&user.token),
    )
    .await;

    let response = app
        .request("GET", "/api/enrollments/stats", None, Some(&user.token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let stats = &response.body["data"]["stats"];
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["active"], 0);
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["dropped"], 1);
    assert_eq!(
        response.body["data"]["achievements"].as_array().map(Vec::len),
        Some(1)
    );
    assert!(
        !response.body["data"]["recentActivity"]
            .as_array()
            .expect("activity array")
            .is_empty()
    );
}

#[tokio::test]
async fn test_malformed_ids_and_query_use_error_envelope() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;

    for (method, uri) in [
        ("GET", "/api/enrollments/course/not-a-uuid"),
        ("DELETE", "/api/enrollments/42"),
        ("GET", "/api/enrollments/my-courses?page=first"),
    ] {
        let response = app.request(method, uri, None, Some(&user.token)).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{method} {uri}");
        assert_eq!(response.body["success"], false, "{method} {uri}");
        assert_eq!(response.body["error"], "VALIDATION", "{method} {uri}");
    }
}
