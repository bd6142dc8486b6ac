//! Conversation listing and deletion integration tests

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::{parse_body, TestApp, UserFixture};

async fn start_conversation(app: &TestApp, user: &UserFixture, message: &str) -> String {
    let body = parse_body(
        app.send(user.request(Method::POST, "/chat", Some(json!({"message": message}))))
            .await,
    )
    .await;
    body["conversation_id"].as_str().unwrap().to_string()
}

fn timestamp(value: &Value) -> DateTime<Utc> {
    value["created_at"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let app = TestApp::new();
    let alice = UserFixture::alice();

    for message in ["one", "two", "three"] {
        start_conversation(&app, &alice, message).await;
    }

    let resp = app
        .send(alice.request(Method::GET, "/conversations", None))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed = parse_body(resp).await;
    let listed = listed.as_array().unwrap();

    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0]["title"], "three");
    assert!(listed
        .windows(2)
        .all(|pair| timestamp(&pair[0]) >= timestamp(&pair[1])));
    for item in listed {
        assert_eq!(item.as_object().unwrap().len(), 3);
    }
}

#[tokio::test]
async fn test_list_is_scoped_to_caller() {
    let app = TestApp::new();
    let alice = UserFixture::alice();
    let bob = UserFixture::bob();

    start_conversation(&app, &alice, "alice's thread").await;

    let listed = parse_body(
        app.send(bob.request(Method::GET, "/conversations", None))
            .await,
    )
    .await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_delete_removes_conversation_and_messages() {
    let app = TestApp::new();
    let alice = UserFixture::alice();
    let id = start_conversation(&app, &alice, "short-lived").await;

    let resp = app
        .send(alice.request(Method::DELETE, &format!("/conversations/{}", id), None))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        parse_body(resp).await["message"],
        "Conversation deleted successfully"
    );

    let resp = app
        .send(alice.request(Method::GET, &format!("/conversations/{}/messages", id), None))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let listed = parse_body(
        app.send(alice.request(Method::GET, "/conversations", None))
            .await,
    )
    .await;
    assert_eq!(listed, json!([]));
    assert_eq!(app.store.message_count(), 0);
}

#[tokio::test]
async fn test_delete_foreign_is_404_and_keeps_data() {
    let app = TestApp::new();
    let alice = UserFixture::alice();
    let bob = UserFixture::bob();
    let id = start_conversation(&app, &alice, "mine").await;

    let resp = app
        .send(bob.request(Method::DELETE, &format!("/conversations/{}", id), None))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(parse_body(resp).await["detail"], "Conversation not found");

    assert_eq!(app.store.message_count(), 2);
}

#[tokio::test]
async fn test_delete_unknown_and_malformed_ids_are_404() {
    let app = TestApp::new();
    let alice = UserFixture::alice();

    let resp = app
        .send(alice.request(
            Method::DELETE,
            &format!("/conversations/{}", Uuid::new_v4()),
            None,
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .send(alice.request(Method::DELETE, "/conversations/not-a-uuid", None))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
