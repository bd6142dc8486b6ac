//! In-memory store
//!
//! Process-local tables behind a single mutex. Used by tests and by
//! `STORE_PROVIDER=memory` for local development. Individual operations can
//! be made to fail after a number of successful calls, which lets tests
//! reproduce partial multi-step writes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use chatrelay_common::StoreError;

use super::{ConversationRepository, MessageRepository, StoreResult, UserRepository};
use crate::domain::entities::{Conversation, Message, User};

/// Store operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    EnsureUser,
    CreateConversation,
    FindConversation,
    ListConversations,
    DeleteConversation,
    AppendMessage,
    ListMessages,
    DeleteMessages,
}

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, User>,
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    /// Remaining successful calls before an operation starts failing
    failures: HashMap<StoreOperation, usize>,
}

impl Tables {
    fn check(&mut self, op: StoreOperation) -> StoreResult<()> {
        match self.failures.get_mut(&op) {
            Some(0) => Err(StoreError::Unavailable(format!("{:?} failed", op))),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `op` succeed `successes` more times, then fail every call
    pub fn fail_after(&self, op: StoreOperation, successes: usize) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.failures.insert(op, successes);
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.failures.clear();
        }
    }

    /// Provisioned user by id
    pub fn user(&self, id: &str) -> Option<User> {
        self.tables
            .lock()
            .ok()
            .and_then(|tables| tables.users.get(id).cloned())
    }

    pub fn message_count(&self) -> usize {
        self.tables.lock().map(|t| t.messages.len()).unwrap_or(0)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("store lock poisoned: {}", e)))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn ensure(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.lock()?;
        tables.check(StoreOperation::EnsureUser)?;
        tables
            .users
            .entry(user.id.clone())
            .or_insert_with(|| user.clone());
        Ok(())
    }
}

#[async_trait]
impl ConversationRepository for MemoryStore {
    async fn create(&self, conversation: &Conversation) -> StoreResult<Conversation> {
        let mut tables = self.lock()?;
        tables.check(StoreOperation::CreateConversation)?;

        if !tables.users.contains_key(&conversation.user_id) {
            return Err(StoreError::InvalidData(format!(
                "user {} does not exist",
                conversation.user_id
            )));
        }

        tables.conversations.push(conversation.clone());
        Ok(conversation.clone())
    }

    async fn find_owned(&self, id: Uuid, user_id: &str) -> StoreResult<Option<Conversation>> {
        let mut tables = self.lock()?;
        tables.check(StoreOperation::FindConversation)?;

        Ok(tables
            .conversations
            .iter()
            .find(|c| c.id == id && c.user_id == user_id)
            .cloned())
    }

    async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Conversation>> {
        let mut tables = self.lock()?;
        tables.check(StoreOperation::ListConversations)?;

        // Later inserts win ties, matching insertion order reversed
        let mut rows: Vec<Conversation> = tables
            .conversations
            .iter()
            .rev()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.lock()?;
        tables.check(StoreOperation::DeleteConversation)?;

        if tables.messages.iter().any(|m| m.conversation_id == id) {
            return Err(StoreError::InvalidData(format!(
                "conversation {} still has messages",
                id
            )));
        }

        tables.conversations.retain(|c| c.id != id);
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn append(&self, message: &Message) -> StoreResult<Message> {
        let mut tables = self.lock()?;
        tables.check(StoreOperation::AppendMessage)?;

        if !tables
            .conversations
            .iter()
            .any(|c| c.id == message.conversation_id)
        {
            return Err(StoreError::InvalidData(format!(
                "conversation {} does not exist",
                message.conversation_id
            )));
        }

        tables.messages.push(message.clone());
        Ok(message.clone())
    }

    async fn list_by_conversation(&self, conversation_id: Uuid) -> StoreResult<Vec<Message>> {
        let mut tables = self.lock()?;
        tables.check(StoreOperation::ListMessages)?;

        // Stable sort keeps insertion order for equal timestamps
        let mut rows: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn delete_by_conversation(&self, conversation_id: Uuid) -> StoreResult<u64> {
        let mut tables = self.lock()?;
        tables.check(StoreOperation::DeleteMessages)?;

        let before = tables.messages.len();
        tables.messages.retain(|m| m.conversation_id != conversation_id);
        Ok((before - tables.messages.len()) as u64)
    }
}
