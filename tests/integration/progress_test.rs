//! Integration tests for the lesson progress endpoints.

mod helpers;

use axum::http::StatusCode;
use uuid::Uuid;

use coursehub_entity::activity::ActivityType;

#[tokio::test]
async fn test_progress_requires_enrollment() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let course = app.create_test_course("Rust 101", 2).await;

    let response = app
        .request(
            "POST",
            &format!("/api/progress/lesson/{}", course.lessons[0].id),
            Some(serde_json::json!({ "completed": true })),
            Some(&user.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["message"], "Not enrolled in this course");
}

#[tokio::test]
async fn test_unknown_lesson_is_not_found() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;

    let response = app
        .request(
            "POST",
            &format!("/api/progress/lesson/{}", Uuid::new_v4()),
            Some(serde_json::json!({ "completed": true })),
            Some(&user.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Lesson not found");
}

#[tokio::test]
async fn test_negative_watch_time_rejected() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let course = app.create_test_course("Rust 101", 1).await;
    app.enroll(&user, course.course.id).await;

    let response = app
        .request(
            "POST",
            &format!("/api/progress/lesson/{}", course.lessons[0].id),
            Some(serde_json::json!({ "watchTime": -1 })),
            Some(&user.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_malformed_lesson_id_uses_error_envelope() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;

    for method in ["GET", "POST"] {
        let body = (method == "POST").then(|| serde_json::json!({ "completed": true }));
        let response = app
            .request(method, "/api/progress/lesson/not-a-uuid", body, Some(&user.token))
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["success"], false);
        assert_eq!(response.body["error"], "VALIDATION");
        assert!(response.body["message"].is_string());
    }
}

#[tokio::test]
async fn test_watch_time_update_without_completion() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let course = app.create_test_course("Rust 101", 2).await;
    app.enroll(&user, course.course.id).await;
    let lesson = course.lessons[0].id;

    let response = app
        .request(
            "POST",
            &format!("/api/progress/lesson/{lesson}"),
            Some(serde_json::json!({ "watchTime": 120 })),
            Some(&user.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let progress = &response.body["data"]["progress"];
    assert_eq!(progress["watchTime"], 120);
    assert_eq!(progress["completed"], false);
    assert!(progress["completedAt"].is_null());

    let completions = app
        .store
        .activities_of(user.id, ActivityType::LessonComplete)
        .await;
    assert!(completions.is_empty());
}

#[tokio::test]
async fn test_lesson_progress_is_null_before_any_update() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let course = app.create_test_course("Rust 101", 1).await;

    let response = app
        .request(
            "GET",
            &format!("/api/progress/lesson/{}", course.lessons[0].id),
            None,
            Some(&user.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"]["progress"].is_null());
}

#[tokio::test]
async fn test_completing_every_lesson_completes_the_course() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let course = app.create_test_course("Rust 101", 2).await;
    app.enroll(&user, course.course.id).await;

    app.complete_lesson(&user, course.lessons[0].id).await;

    let response = app
        .request(
            "GET",
            &format!("/api/progress/course/{}", course.course.id),
            None,
            Some(&user.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["progressPercentage"], 50);
    assert_eq!(response.body["data"]["completedLessons"], 1);
    assert_eq!(response.body["data"]["totalLessons"], 2);

    app.complete_lesson(&user, course.lessons[1].id).await;

    let response = app
        .request(
            "GET",
            &format!("/api/enrollments/course/{}", course.course.id),
            None,
            Some(&user.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let enrollment = &response.body["data"]["enrollment"];
    assert_eq!(enrollment["status"], "COMPLETED");
    assert_eq!(enrollment["progress"], 100);
    assert!(!enrollment["completedAt"].is_null());

    assert_eq!(app.store.grant_count(user.id).await, 1);
    let titles: Vec<String> = app
        .store
        .notifications_of(user.id)
        .await
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert!(titles.contains(&"Course Completed!".to_string()));
}

#[tokio::test]
async fn test_repeat_completion_does_not_duplicate_side_effects() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let course = app.create_test_course("Rust 101", 1).await;
    app.enroll(&user, course.course.id).await;

    app.complete_lesson(&user, course.lessons[0].id).await;
    app.complete_lesson(&user, course.lessons[0].id).await;

    let course_completions = app
        .store
        .activities_of(user.id, ActivityType::CourseComplete)
        .await;
    assert_eq!(course_completions.len(), 1);
    assert_eq!(app.store.grant_count(user.id).await, 1);
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_the_update() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let course = app.create_test_course("Rust 101", 1).await;
    app.enroll(&user, course.course.id).await;
    app.store.fail_notifications(true);

    let response = app.complete_lesson(&user, course.lessons[0].id).await;
    assert_eq!(response.body["data"]["progress"]["completed"], true);
    assert_eq!(app.store.grant_count(user.id).await, 1);
}

#[tokio::test]
async fn test_overall_progress_summarizes_enrollments() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let rust = app.create_test_course("Rust 101", 1).await;
    let go = app.create_test_course("Go 101", 2).await;
    app.enroll(&user, rust.course.id).await;
    app.enroll(&user, go.course.id).await;

    app.complete_lesson(&user, rust.lessons[0].id).await;
    app.complete_lesson(&user, go.lessons[0].id).await;

    let response = app
        .request("GET", "/api/progress/overall", None, Some(&user.token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["totalEnrollments"], 2);
    assert_eq!(data["activeEnrollments"], 1);
    assert_eq!(data["completedCourses"], 1);
    assert_eq!(data["totalCompletedLessons"], 2);
    assert_eq!(data["learningStreak"], 1);
    assert_eq!(data["enrollments"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_course_progress_for_unknown_course() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;

    let response = app
        .request(
            "GET",
            &format!("/api/progress/course/{}", Uuid::new_v4()),
            None,
            Some(&user.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
