//! Route definitions for Conversations domain API

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{chat, conversations, messages};
use super::middleware::ConversationsState;

/// Create conversation routes
fn conversation_routes() -> Router<ConversationsState> {
    Router::new()
        .route("/conversations", get(conversations::list_conversations))
        .route(
            "/conversations/{id}",
            delete(conversations::delete_conversation),
        )
}

/// Create message routes
fn message_routes() -> Router<ConversationsState> {
    Router::new()
        .route("/chat", post(chat::chat))
        .route(
            "/conversations/{id}/messages",
            get(messages::list_messages),
        )
}

/// Create all Conversations domain API routes
pub fn routes() -> Router<ConversationsState> {
    Router::new()
        .merge(conversation_routes())
        .merge(message_routes())
}
