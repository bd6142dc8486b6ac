//! Message history integration tests

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::common::{parse_body, TestApp, UserFixture};

#[tokio::test]
async fn test_history_is_chronological() {
    let app = TestApp::new();
    let alice = UserFixture::alice();

    let first = parse_body(
        app.send(alice.request(Method::POST, "/chat", Some(json!({"message": "one"}))))
            .await,
    )
    .await;
    let id = first["conversation_id"].as_str().unwrap().to_string();

    for message in ["two", "three"] {
        app.send(alice.request(
            Method::POST,
            "/chat",
            Some(json!({"message": message, "conversation_id": id})),
        ))
        .await;
    }

    let resp = app
        .send(alice.request(Method::GET, &format!("/conversations/{}/messages", id), None))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let messages = parse_body(resp).await;
    let messages = messages.as_array().unwrap();

    assert_eq!(messages.len(), 6);
    let contents: Vec<&str> = messages
        .iter()
        .filter(|m| m["role"] == "user")
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["one", "two", "three"]);

    let times: Vec<DateTime<Utc>> = messages
        .iter()
        .map(|m| m["created_at"].as_str().unwrap().parse().unwrap())
        .collect();
    assert!(times.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[tokio::test]
async fn test_foreign_history_is_404() {
    let app = TestApp::new();
    let alice = UserFixture::alice();
    let bob = UserFixture::bob();

    let owned = parse_body(
        app.send(alice.request(Method::POST, "/chat", Some(json!({"message": "secret"}))))
            .await,
    )
    .await;
    let id = owned["conversation_id"].as_str().unwrap();

    let resp = app
        .send(bob.request(Method::GET, &format!("/conversations/{}/messages", id), None))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(parse_body(resp).await, json!({"detail": "Conversation not found"}));
}

#[tokio::test]
async fn test_malformed_id_is_404() {
    let app = TestApp::new();
    let alice = UserFixture::alice();

    let resp = app
        .send(alice.request(Method::GET, "/conversations/12345/messages", None))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
