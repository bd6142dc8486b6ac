//! Domain entities for the Conversations domain
//!
//! Conversations and messages are immutable once written. Identifiers and
//! timestamps are assigned here, not by the store, so every backend returns
//! the same shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chatrelay_auth::Identity;
use chatrelay_common::{Error, Result};

/// Titles keep at most this many characters of the first message
pub const TITLE_MAX_CHARS: usize = 50;

/// Appended to a title that was cut short
pub const TITLE_ELLIPSIS: &str = "...";

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Derive a conversation title from its first message.
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn derive_title(message: &str) -> String {
    let mut chars = message.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();

    if chars.next().is_some() {
        format!("{}{}", head, TITLE_ELLIPSIS)
    } else {
        head
    }
}

/// User row, provisioned from a verified identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Identity> for User {
    fn from(identity: &Identity) -> Self {
        User {
            id: identity.uid.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Conversation entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Start a conversation titled after its first message
    pub fn new(user_id: impl Into<String>, first_message: &str) -> Self {
        Conversation {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            title: derive_title(first_message),
            created_at: Utc::now(),
        }
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new user message
    pub fn new_user(conversation_id: Uuid, content: String) -> Result<Self> {
        Self::validate_content(&content)?;

        Ok(Self::with_role(conversation_id, MessageRole::User, content))
    }

    /// Create a new assistant message; provider output is stored verbatim
    pub fn new_assistant(conversation_id: Uuid, content: String) -> Self {
        Self::with_role(conversation_id, MessageRole::Assistant, content)
    }

    fn with_role(conversation_id: Uuid, role: MessageRole, content: String) -> Self {
        Message {
            id: Uuid::new_v4(),
            conversation_id,
            role,
            content,
            created_at: Utc::now(),
        }
    }

    /// User content must carry at least one non-whitespace character
    pub fn validate_content(content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(Error::Validation(
                "Message content cannot be empty or whitespace-only".to_string(),
            ));
        }
        Ok(())
    }
}
