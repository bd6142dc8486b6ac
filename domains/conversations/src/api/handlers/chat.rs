//! Chat turn API handler

use axum::{extract::State, Json};
use chatrelay_auth::AuthUser;
use chatrelay_common::{Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::parse_conversation_id;
use crate::api::middleware::ConversationsState;
use crate::domain::entities::Message;
use crate::domain::service::{ChatCommand, ChatOutcome, DEFAULT_MODEL};

/// Request for one chat turn
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(
        length(min = 1, max = 32000),
        custom(function = "validate_not_blank", message = "Message cannot be blank")
    )]
    pub message: String,

    /// Continue this conversation; absent, null or empty opens a new one
    #[serde(default)]
    pub conversation_id: Option<String>,

    #[validate(length(min = 1, max = 100))]
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn validate_not_blank(message: &str) -> std::result::Result<(), validator::ValidationError> {
    Message::validate_content(message).map_err(|_| validator::ValidationError::new("blank"))
}

impl ChatRequest {
    /// Resolve the target conversation; malformed ids are unknown conversations
    pub fn target_conversation(&self) -> Result<Option<Uuid>> {
        match self.conversation_id.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => parse_conversation_id(raw).map(Some),
        }
    }
}

/// Response for one chat turn
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: Uuid,
    /// Id of the stored assistant message
    pub message_id: Uuid,
}

impl From<ChatOutcome> for ChatResponse {
    fn from(outcome: ChatOutcome) -> Self {
        Self {
            response: outcome.reply,
            conversation_id: outcome.conversation_id,
            message_id: outcome.message_id,
        }
    }
}

/// Send a message and receive the assistant reply
pub async fn chat(
    AuthUser(identity): AuthUser,
    State(state): State<ConversationsState>,
    ValidatedJson(req): ValidatedJson<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let command = ChatCommand {
        conversation_id: req.target_conversation()?,
        message: req.message,
        model: req.model,
    };

    let outcome = state.service.handle_chat(&identity, command).await?;
    Ok(Json(outcome.into()))
}
