//! POST /chat integration tests

use std::sync::Arc;

use axum::{
    http::{Method, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

use chatrelay_llm::{openai::OpenAiService, LlmConfig, LlmMessage, LlmRole};

use crate::common::{parse_body, TestApp, UserFixture};

#[tokio::test]
async fn test_first_message_creates_conversation_and_stores_both_turns() {
    let app = TestApp::new();
    let alice = UserFixture::alice();

    let resp = app
        .send(alice.request(Method::POST, "/chat", Some(json!({"message": "Hello"}))))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = parse_body(resp).await;
    assert_eq!(body["response"], "Mock response to: Hello");
    let conversation_id = body["conversation_id"].as_str().unwrap().to_string();
    let message_id = body["message_id"].as_str().unwrap().to_string();

    // Provider saw exactly the single user turn
    let requests = app.llm.recorded_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].messages, vec![LlmMessage::user("Hello")]);
    assert_eq!(requests[0].model, "gpt-4");

    // The new conversation is listed
    let resp = app
        .send(alice.request(Method::GET, "/conversations", None))
        .await;
    let listed = parse_body(resp).await;
    assert_eq!(listed[0]["id"], conversation_id.as_str());
    assert_eq!(listed[0]["title"], "Hello");

    // Both turns are stored; the assistant turn carries the returned id
    let resp = app
        .send(alice.request(
            Method::GET,
            &format!("/conversations/{}/messages", conversation_id),
            None,
        ))
        .await;
    let messages = parse_body(resp).await;
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "Hello");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[1]["id"], message_id.as_str());
}

#[tokio::test]
async fn test_follow_up_sends_history_of_three_in_order() {
    let app = TestApp::new();
    let alice = UserFixture::alice();

    let first = parse_body(
        app.send(alice.request(Method::POST, "/chat", Some(json!({"message": "Hello"}))))
            .await,
    )
    .await;
    let conversation_id = first["conversation_id"].clone();

    let resp = app
        .send(alice.request(
            Method::POST,
            "/chat",
            Some(json!({"message": "Tell me more", "conversation_id": conversation_id})),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let second = parse_body(resp).await;
    assert_eq!(second["conversation_id"], conversation_id);

    let history = &app.llm.recorded_requests()[1].messages;
    assert_eq!(history.len(), 3);
    let roles: Vec<LlmRole> = history.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![LlmRole::User, LlmRole::Assistant, LlmRole::User]);
    assert_eq!(history[0].content, "Hello");
    assert_eq!(history[1].content, "Mock response to: Hello");
    assert_eq!(history[2].content, "Tell me more");
}

#[tokio::test]
async fn test_model_is_forwarded() {
    let app = TestApp::new();
    let alice = UserFixture::alice();

    let resp = app
        .send(alice.request(
            Method::POST,
            "/chat",
            Some(json!({"message": "Hi", "model": "gpt-4o-mini"})),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(app.llm.recorded_requests()[0].model, "gpt-4o-mini");
}

#[tokio::test]
async fn test_provider_failure_returns_500_and_keeps_user_message() {
    let app = TestApp::new();
    let alice = UserFixture::alice();
    app.llm.fail_with("upstream unavailable");

    let resp = app
        .send(alice.request(Method::POST, "/chat", Some(json!({"message": "Hello"}))))
        .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = parse_body(resp).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("upstream unavailable"));

    let listed = parse_body(
        app.send(alice.request(Method::GET, "/conversations", None))
            .await,
    )
    .await;
    let conversation_id = listed[0]["id"].as_str().unwrap();

    let messages = parse_body(
        app.send(alice.request(
            Method::GET,
            &format!("/conversations/{}/messages", conversation_id),
            None,
        ))
        .await,
    )
    .await;
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "Hello");
}

#[tokio::test]
async fn test_foreign_conversation_is_404() {
    let app = TestApp::new();
    let alice = UserFixture::alice();
    let bob = UserFixture::bob();

    let owned = parse_body(
        app.send(alice.request(Method::POST, "/chat", Some(json!({"message": "Private"}))))
            .await,
    )
    .await;

    let resp = app
        .send(bob.request(
            Method::POST,
            "/chat",
            Some(json!({"message": "Let me in", "conversation_id": owned["conversation_id"]})),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(parse_body(resp).await["detail"], "Conversation not found");
    assert_eq!(app.store.message_count(), 2);
}

#[tokio::test]
async fn test_unknown_conversation_is_404() {
    let app = TestApp::new();
    let alice = UserFixture::alice();

    let resp = app
        .send(alice.request(
            Method::POST,
            "/chat",
            Some(json!({"message": "Hi", "conversation_id": Uuid::new_v4()})),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_bodies_are_400() {
    let app = TestApp::new();
    let alice = UserFixture::alice();

    for body in [
        json!({}),
        json!({"message": ""}),
        json!({"message": "   "}),
        json!({"message": "Hi", "model": ""}),
        json!({"message": "Hi", "conversation_id": 42}),
        json!({"message": "x".repeat(32_001)}),
    ] {
        let resp = app
            .send(alice.request(Method::POST, "/chat", Some(body.clone())))
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        assert!(parse_body(resp).await["detail"].is_string());
    }

    assert_eq!(app.store.message_count(), 0);
    assert!(app.llm.recorded_requests().is_empty());
}

#[tokio::test]
async fn test_long_message_title_is_truncated() {
    let app = TestApp::new();
    let alice = UserFixture::alice();
    let message = "abcdefghij".repeat(6);

    app.send(alice.request(Method::POST, "/chat", Some(json!({"message": message}))))
        .await;

    let listed = parse_body(
        app.send(alice.request(Method::GET, "/conversations", None))
            .await,
    )
    .await;
    assert_eq!(
        listed[0]["title"],
        format!("{}...", &message[..50]).as_str()
    );
}

#[tokio::test]
async fn test_caller_is_provisioned() {
    let app = TestApp::new();
    let alice = UserFixture::alice();

    app.send(alice.request(Method::POST, "/chat", Some(json!({"message": "Hello"}))))
        .await;

    let user = app.store.user(&alice.uid).unwrap();
    assert_eq!(user.email, alice.email);
}

#[tokio::test]
async fn test_empty_conversation_id_opens_new_thread() {
    let app = TestApp::new();
    let alice = UserFixture::alice();

    let resp = app
        .send(alice.request(
            Method::POST,
            "/chat",
            Some(json!({"message": "Hello", "conversation_id": ""})),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = parse_body(resp).await;
    assert!(Uuid::parse_str(body["conversation_id"].as_str().unwrap()).is_ok());

    let listed = parse_body(
        app.send(alice.request(Method::GET, "/conversations", None))
            .await,
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_conversation_id_is_404() {
    let app = TestApp::new();
    let alice = UserFixture::alice();

    let resp = app
        .send(alice.request(
            Method::POST,
            "/chat",
            Some(json!({"message": "Hello", "conversation_id": "not-a-uuid"})),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        parse_body(resp).await,
        json!({"detail": "Conversation not found"})
    );
    assert_eq!(app.store.message_count(), 0);
    assert!(app.llm.recorded_requests().is_empty());
}

/// OpenAI stand-in that always answers 429 with a quota error
async fn quota_exhausted_provider() -> OpenAiService {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|Json(_): Json<Value>| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "error": {
                        "message": "You exceeded your current quota",
                        "type": "insufficient_quota"
                    }
                })),
            )
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut config = LlmConfig::new("openai", "sk-test");
    config.base_url = Some(format!("http://{}", addr));
    OpenAiService::new(config)
}

#[tokio::test]
async fn test_quota_error_text_reaches_detail() {
    let app = TestApp::with_provider(Arc::new(quota_exhausted_provider().await));
    let alice = UserFixture::alice();

    let resp = app
        .send(alice.request(Method::POST, "/chat", Some(json!({"message": "Hello"}))))
        .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let detail = parse_body(resp).await["detail"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(detail.starts_with("Completion error:"));
    assert!(detail.contains("exceeded your current quota"));

    // The user turn is kept
    assert_eq!(app.store.message_count(), 1);
}
