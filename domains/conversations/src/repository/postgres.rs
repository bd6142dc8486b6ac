//! Postgres store

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ConversationRepository, MessageRepository, StoreResult, UserRepository};
use crate::domain::entities::{Conversation, Message, User};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn ensure(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ConversationRepository for PgStore {
    async fn create(&self, conv: &Conversation) -> StoreResult<Conversation> {
        let created = sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (id, user_id, title, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, created_at
            "#,
        )
        .bind(conv.id)
        .bind(&conv.user_id)
        .bind(&conv.title)
        .bind(conv.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_owned(&self, id: Uuid, user_id: &str) -> StoreResult<Option<Conversation>> {
        let row = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, user_id, title, created_at
            FROM conversations
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Conversation>> {
        let rows = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, user_id, title, created_at
            FROM conversations
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl MessageRepository for PgStore {
    async fn append(&self, msg: &Message) -> StoreResult<Message> {
        let created = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (id, conversation_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, conversation_id, role, content, created_at
            "#,
        )
        .bind(msg.id)
        .bind(msg.conversation_id)
        .bind(msg.role)
        .bind(&msg.content)
        .bind(msg.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list_by_conversation(&self, conversation_id: Uuid) -> StoreResult<Vec<Message>> {
        // seq breaks ties between rows written in the same microsecond
        let rows = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, conversation_id, role, content, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn delete_by_conversation(&self, conversation_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM messages WHERE conversation_id = $1")
            .bind(conversation_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
