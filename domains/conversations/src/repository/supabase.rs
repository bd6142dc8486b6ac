//! Supabase store
//!
//! Talks to the PostgREST endpoint of a Supabase project
//! (`{url}/rest/v1/{table}`) using reqwest. Filters use the `eq.` operator
//! and ordering is pushed down with `order=created_at.asc|desc`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use chatrelay_common::StoreError;

use super::{ConversationRepository, MessageRepository, StoreResult, UserRepository};
use crate::domain::entities::{Conversation, Message, User};

#[derive(Clone)]
pub struct SupabaseStore {
    client: Client,
    rest_url: String,
    key: String,
}

impl SupabaseStore {
    pub fn new(url: &str, key: &str) -> Self {
        Self {
            client: Client::new(),
            rest_url: format!("{}/rest/v1", url.trim_end_matches('/')),
            key: key.to_string(),
        }
    }

    fn table(&self, method: reqwest::Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    async fn send(request: RequestBuilder) -> StoreResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            tracing::warn!(status = %status, body = %body, "Supabase request failed");
            return Err(StoreError::Response {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn rows<T: DeserializeOwned>(request: RequestBuilder) -> StoreResult<Vec<T>> {
        Self::send(request)
            .await?
            .json::<Vec<T>>()
            .await
            .map_err(|e| StoreError::InvalidData(format!("Unexpected response shape: {}", e)))
    }

    async fn insert<T: Serialize + DeserializeOwned>(&self, table: &str, row: &T) -> StoreResult<T> {
        let request = self
            .table(reqwest::Method::POST, table)
            .header("Prefer", "return=representation")
            .json(row);

        Self::rows::<T>(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidData(format!("Insert into {} returned no rows", table)))
    }
}

#[async_trait]
impl UserRepository for SupabaseStore {
    async fn ensure(&self, user: &User) -> StoreResult<()> {
        let request = self
            .table(reqwest::Method::POST, "users")
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=ignore-duplicates,return=minimal")
            .json(user);

        Self::send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl ConversationRepository for SupabaseStore {
    async fn create(&self, conversation: &Conversation) -> StoreResult<Conversation> {
        self.insert("conversations", conversation).await
    }

    async fn find_owned(&self, id: Uuid, user_id: &str) -> StoreResult<Option<Conversation>> {
        let request = self.table(reqwest::Method::GET, "conversations").query(&[
            ("select", "*".to_string()),
            ("id", format!("eq.{}", id)),
            ("user_id", format!("eq.{}", user_id)),
        ]);

        Ok(Self::rows::<Conversation>(request).await?.into_iter().next())
    }

    async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Conversation>> {
        let request = self.table(reqwest::Method::GET, "conversations").query(&[
            ("select", "*".to_string()),
            ("user_id", format!("eq.{}", user_id)),
            ("order", "created_at.desc".to_string()),
        ]);

        Self::rows(request).await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let request = self
            .table(reqwest::Method::DELETE, "conversations")
            .query(&[("id", format!("eq.{}", id))]);

        Self::send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for SupabaseStore {
    async fn append(&self, message: &Message) -> StoreResult<Message> {
        self.insert("messages", message).await
    }

    async fn list_by_conversation(&self, conversation_id: Uuid) -> StoreResult<Vec<Message>> {
        let request = self.table(reqwest::Method::GET, "messages").query(&[
            ("select", "*".to_string()),
            ("conversation_id", format!("eq.{}", conversation_id)),
            ("order", "created_at.asc".to_string()),
        ]);

        Self::rows(request).await
    }

    async fn delete_by_conversation(&self, conversation_id: Uuid) -> StoreResult<u64> {
        let request = self
            .table(reqwest::Method::DELETE, "messages")
            .query(&[("conversation_id", format!("eq.{}", conversation_id))])
            .header("Prefer", "return=representation");

        let deleted = Self::rows::<serde_json::Value>(request).await?;
        Ok(deleted.len() as u64)
    }
}
