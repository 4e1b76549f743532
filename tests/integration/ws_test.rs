//! Integration tests for WebSocket connection and messaging.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use futures::{SinkExt, Stream, StreamExt};
use serde_json::Value;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use coursehub_core::types::id::UserId;

/// Serve `app` on an ephemeral port and return its address.
async fn spawn_server(app: &helpers::TestApp) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    addr
}

/// Read frames until a text frame arrives.
async fn next_json<S>(ws: &mut S) -> Value
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("frame before timeout")
            .expect("stream open")
            .expect("frame ok");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("json frame");
        }
    }
}

#[tokio::test]
async fn test_ws_upgrade_with_bad_token() {
    let app = helpers::TestApp::new().await;
    let addr = spawn_server(&app).await;

    let err = tokio_tungstenite::connect_async(format!("ws://{addr}/ws?token=garbage"))
        .await
        .expect_err("handshake must be refused");

    match err {
        WsError::Http(response) => {
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
        other => panic!("expected an HTTP rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_oldest_socket_is_closed_when_user_hits_the_cap() {
    let app = helpers::TestApp::with_config(|config| {
        config.realtime.max_connections_per_user = 1;
    })
    .await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let addr = spawn_server(&app).await;
    let url = format!("ws://{addr}/ws?token={}", user.token);

    let (mut first, _) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .expect("connect first");
    first
        .send(Message::Text(r#"{"type":"ping"}"#.into()))
        .await
        .expect("send ping");
    assert_eq!(next_json(&mut first).await["event"], "pong");

    let (mut second, _) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .expect("connect second");
    second
        .send(Message::Text(r#"{"type":"ping"}"#.into()))
        .await
        .expect("send ping");
    assert_eq!(next_json(&mut second).await["event"], "pong");

    // The evicted socket receives a close frame, then the stream ends.
    let mut saw_close = false;
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), first.next())
            .await
            .expect("evicted socket was left open");
        match frame {
            Some(Ok(Message::Close(_))) => saw_close = true,
            Some(Ok(_)) => {}
            Some(Err(_)) | None => break,
        }
    }
    assert!(saw_close);
    assert_eq!(
        app.state
            .realtime
            .connections
            .user_connection_count(UserId(user.id)),
        1
    );
}

#[tokio::test]
async fn test_ping_gets_pong() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let addr = spawn_server(&app).await;

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws?token={}", user.token))
        .await
        .expect("connect");

    ws.send(Message::Text(r#"{"type":"ping"}"#.into()))
        .await
        .expect("send ping");

    let frame = next_json(&mut ws).await;
    assert_eq!(frame["event"], "pong");
}

#[tokio::test]
async fn test_lesson_completion_is_pushed_to_the_learner() {
    let app = helpers::TestApp::new().await;
    let user = app.create_test_user("ada@example.com", "Ada").await;
    let course = app.create_test_course("Rust 101", 2).await;
    app.enroll(&user, course.course.id).await;
    let addr = spawn_server(&app).await;

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws?token={}", user.token))
        .await
        .expect("connect");

    // Round-trip a ping so registration has happened before the update.
    ws.send(Message::Text(r#"{"type":"ping"}"#.into()))
        .await
        .expect("send ping");
    assert_eq!(next_json(&mut ws).await["event"], "pong");
    assert_eq!(
        app.state
            .realtime
            .connections
            .user_connection_count(UserId(user.id)),
        1
    );

    app.complete_lesson(&user, course.lessons[0].id).await;

    let frame = next_json(&mut ws).await;
    assert_eq!(frame["event"], "progress:updated");
    assert_eq!(frame["data"]["lessonId"], course.lessons[0].id.to_string());
    assert_eq!(frame["data"]["courseId"], course.course.id.to_string());
    assert_eq!(frame["data"]["progress"], 50);
}
