//! Conversation management API handlers

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
use crate::domain::entities::Conversation;

/// Conversation response DTO
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            title: c.title,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteConversationResponse {
    pub message: &'static str,
}

/// List conversations for the authenticated user, newest first
pub async fn list_conversations(
    AuthUser(identity): AuthUser,
    State(state): State<ConversationsState>,
) -> Result<Json<Vec<ConversationResponse>>> {
    let convs = state.service.list_conversations(&identity).await?;

    let responses: Vec<ConversationResponse> = convs.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

/// Delete a conversation and all of its messages
pub async fn delete_conversation(
    AuthUser(identity): AuthUser,
    State(state): State<ConversationsState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteConversationResponse>> {
    let id = parse_conversation_id(&id)?;
    state.service.delete_conversation(id, &identity).await?;

    Ok(Json(DeleteConversationResponse {
        message: "Conversation deleted successfully",
    }))
}
