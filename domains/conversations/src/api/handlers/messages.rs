//! Message API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use chatrelay_auth::AuthUser;
use chatrelay_common::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::parse_conversation_id;
use crate::api::middleware::ConversationsState;
use crate::domain::entities::{Message, MessageRole};

/// Message response DTO
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            role: m.role,
            content: m.content,
            created_at: m.created_at,
        }
    }
}

/// List messages in a conversation, oldest first
pub async fn list_messages(
    AuthUser(identity): AuthUser,
    State(state): State<ConversationsState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MessageResponse>>> {
    let id = parse_conversation_id(&id)?;
    let messages = state.service.get_messages(id, &identity).await?;

    Ok(Json(messages.into_iter().map(Into::into).collect()))
}
