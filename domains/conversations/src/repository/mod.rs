//! Repository implementations for Conversations domain
//!
//! Persistence is reached through three narrow traits so the orchestrator
//! never sees which backend is wired in:
//! - `postgres`: direct SQL over an sqlx pool
//! - `supabase`: PostgREST over HTTP
//! - `memory`: process-local tables for tests and development

pub mod memory;
pub mod postgres;
pub mod supabase;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use chatrelay_common::StoreError;

use crate::domain::entities::{Conversation, Message, User};

pub use memory::{MemoryStore, StoreOperation};
pub use postgres::PgStore;
pub use supabase::SupabaseStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// User rows, provisioned from verified identities
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert the user unless a row with the same id already exists
    async fn ensure(&self, user: &User) -> StoreResult<()>;
}

/// Conversation rows
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn create(&self, conversation: &Conversation) -> StoreResult<Conversation>;

    /// Select by id AND owner; foreign and absent rows both yield `None`
    async fn find_owned(&self, id: Uuid, user_id: &str) -> StoreResult<Option<Conversation>>;

    /// All conversations of a user, newest first
    async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Conversation>>;

    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

/// Message rows
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn append(&self, message: &Message) -> StoreResult<Message>;

    /// All messages of a conversation, oldest first
    async fn list_by_conversation(&self, conversation_id: Uuid) -> StoreResult<Vec<Message>>;

    async fn delete_by_conversation(&self, conversation_id: Uuid) -> StoreResult<u64>;
}

/// Combined repository access for the Conversations domain
#[derive(Clone)]
pub struct ConversationsRepositories {
    pub users: Arc<dyn UserRepository>,
    pub conversations: Arc<dyn ConversationRepository>,
    pub messages: Arc<dyn MessageRepository>,
}

impl ConversationsRepositories {
    /// Wire all three repositories to one backend
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + ConversationRepository + MessageRepository + 'static,
    {
        Self {
            users: store.clone(),
            conversations: store.clone(),
            messages: store,
        }
    }
}

impl std::fmt::Debug for ConversationsRepositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationsRepositories").finish_non_exhaustive()
    }
}

/// Store backend configuration
#[derive(Clone)]
pub struct StoreConfig {
    /// Provider (supabase, postgres, memory)
    pub provider: String,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub database_url: Option<String>,
    pub run_migrations: bool,
}

impl StoreConfig {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            supabase_url: None,
            supabase_key: None,
            database_url: None,
            run_migrations: false,
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("provider", &self.provider)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &self.supabase_key.as_ref().map(|_| "[REDACTED]"))
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

/// Store factory
pub struct StoreFactory;

impl StoreFactory {
    /// Create repositories for the configured backend
    pub async fn create(config: &StoreConfig) -> StoreResult<ConversationsRepositories> {
        match config.provider.as_str() {
            "supabase" => {
                let url = required(&config.supabase_url, "SUPABASE_URL")?;
                let key = required(&config.supabase_key, "SUPABASE_KEY")?;
                tracing::info!(url = %url, "Creating Supabase store");
                let store = SupabaseStore::new(url, key);
                Ok(ConversationsRepositories::from_store(Arc::new(store)))
            }
            "postgres" => {
                let url = required(&config.database_url, "DATABASE_URL")?;
                tracing::info!("Connecting to Postgres store");
                let pool = sqlx::PgPool::connect(url).await?;

                if config.run_migrations {
                    tracing::info!("Running database migrations");
                    sqlx::migrate!("../../migrations")
                        .run(&pool)
                        .await
                        .map_err(|e| StoreError::Configuration(format!("Migration failed: {}", e)))?;
                }

                Ok(ConversationsRepositories::from_store(Arc::new(PgStore::new(pool))))
            }
            "memory" => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                Ok(ConversationsRepositories::from_store(Arc::new(MemoryStore::new())))
            }
            provider => Err(StoreError::Configuration(format!(
                "Unknown store provider: {}. Supported providers: supabase, postgres, memory",
                provider
            ))),
        }
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> StoreResult<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| StoreError::Configuration(format!("{} is required", name)))
}
