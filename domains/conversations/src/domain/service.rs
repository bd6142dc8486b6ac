//! Chat orchestration
//!
//! `ConversationService` sequences every chat turn: provision the caller,
//! open or resolve the conversation, persist the user message, replay the
//! full history to the completion provider and persist the reply. Steps are
//! not grouped in a transaction; a failure leaves earlier writes in place.

use std::sync::Arc;

use uuid::Uuid;

use chatrelay_auth::Identity;
use chatrelay_common::{Error, Result};
use chatrelay_llm::{CompletionRequest, LlmMessage, LlmService};

use crate::domain::entities::{Conversation, Message, MessageRole, User};
use crate::repository::ConversationsRepositories;

/// Model used when a chat request does not name one
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Upper bound on reply length sent to the provider
pub const MAX_OUTPUT_TOKENS: u32 = 1000;

pub const SAMPLING_TEMPERATURE: f64 = 0.7;

/// One chat turn as requested by the caller
#[derive(Debug, Clone)]
pub struct ChatCommand {
    pub message: String,
    pub conversation_id: Option<Uuid>,
    pub model: String,
}

impl ChatCommand {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn in_conversation(mut self, conversation_id: Uuid) -> Self {
        self.conversation_id = Some(conversation_id);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Result of a successful chat turn
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    pub reply: String,
    pub conversation_id: Uuid,
    /// Id of the persisted assistant message
    pub message_id: Uuid,
}

#[derive(Clone)]
pub struct ConversationService {
    repos: ConversationsRepositories,
    llm: Arc<dyn LlmService>,
}

impl ConversationService {
    pub fn new(repos: ConversationsRepositories, llm: Arc<dyn LlmService>) -> Self {
        Self { repos, llm }
    }

    pub async fn handle_chat(&self, identity: &Identity, command: ChatCommand) -> Result<ChatOutcome> {
        let ChatCommand {
            message,
            conversation_id,
            model,
        } = command;

        // Reject bad input before anything is written
        Message::validate_content(&message)?;
        let user_id = identity.uid.as_str();

        let conversation_id = match conversation_id {
            Some(id) => self.owned_conversation(id, user_id).await?.id,
            None => {
                self.repos.users.ensure(&User::from(identity)).await?;
                let conversation = self
                    .repos
                    .conversations
                    .create(&Conversation::new(user_id, &message))
                    .await?;
                tracing::info!(
                    conversation_id = %conversation.id,
                    user_id = %user_id,
                    "Created conversation"
                );
                conversation.id
            }
        };

        self.repos
            .messages
            .append(&Message::new_user(conversation_id, message)?)
            .await?;

        let history = self
            .repos
            .messages
            .list_by_conversation(conversation_id)
            .await?;

        let request = CompletionRequest {
            model,
            messages: history.into_iter().map(to_llm_message).collect(),
            max_tokens: Some(MAX_OUTPUT_TOKENS),
            temperature: Some(SAMPLING_TEMPERATURE),
        };

        tracing::debug!(
            conversation_id = %conversation_id,
            model = %request.model,
            turns = request.messages.len(),
            "Requesting completion"
        );

        let completion = self.llm.complete(request).await.map_err(|e| {
            tracing::warn!(conversation_id = %conversation_id, error = %e, "Completion failed");
            Error::Completion(e.to_string())
        })?;

        tracing::debug!(
            conversation_id = %conversation_id,
            model = %completion.model,
            input_tokens = completion.input_tokens,
            output_tokens = completion.output_tokens,
            stop_reason = %completion.stop_reason,
            "Completion received"
        );

        let reply = self
            .repos
            .messages
            .append(&Message::new_assistant(conversation_id, completion.content))
            .await?;

        Ok(ChatOutcome {
            reply: reply.content,
            conversation_id,
            message_id: reply.id,
        })
    }

    /// Conversations of the caller, newest first
    pub async fn list_conversations(&self, identity: &Identity) -> Result<Vec<Conversation>> {
        Ok(self.repos.conversations.list_by_user(&identity.uid).await?)
    }

    /// Messages of an owned conversation, oldest first
    pub async fn get_messages(&self, conversation_id: Uuid, identity: &Identity) -> Result<Vec<Message>> {
        self.owned_conversation(conversation_id, &identity.uid).await?;
        Ok(self
            .repos
            .messages
            .list_by_conversation(conversation_id)
            .await?)
    }

    /// Remove an owned conversation: messages first, then the row
    pub async fn delete_conversation(&self, conversation_id: Uuid, identity: &Identity) -> Result<()> {
        self.owned_conversation(conversation_id, &identity.uid).await?;

        let removed = self
            .repos
            .messages
            .delete_by_conversation(conversation_id)
            .await?;
        self.repos.conversations.delete(conversation_id).await?;

        tracing::info!(
            conversation_id = %conversation_id,
            messages = removed,
            "Deleted conversation"
        );
        Ok(())
    }

    async fn owned_conversation(&self, id: Uuid, user_id: &str) -> Result<Conversation> {
        self.repos
            .conversations
            .find_owned(id, user_id)
            .await?
            .ok_or_else(Error::conversation_not_found)
    }
}

fn to_llm_message(message: Message) -> LlmMessage {
    match message.role {
        MessageRole::User => LlmMessage::user(message.content),
        MessageRole::Assistant => LlmMessage::assistant(message.content),
    }
}
