//! Conversations domain: chat orchestration, threads, messages

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{derive_title, Conversation, Message, MessageRole, User};
pub use domain::service::{
    ChatCommand, ChatOutcome, ConversationService, DEFAULT_MODEL, MAX_OUTPUT_TOKENS,
    SAMPLING_TEMPERATURE,
};

// Re-export repository types
pub use repository::{
    ConversationRepository, ConversationsRepositories, MemoryStore, MessageRepository, PgStore,
    StoreConfig, StoreFactory, StoreOperation, SupabaseStore, UserRepository,
};

// Re-export API types
pub use api::routes;
pub use api::ConversationsState;
