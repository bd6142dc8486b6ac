//! Chatrelay Completion Service
//!
//! Provides chat completion with support for:
//! - OpenAI chat completions API for production
//! - Mock service for testing and development, with request recording
//!   and switchable failure

pub mod mock;
pub mod openai;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    #[error("LLM request error: {0}")]
    Request(String),

    #[error("LLM response error: {0}")]
    Response(String),

    #[error("LLM rate limit exceeded: {0}")]
    RateLimit(String),
}

/// Speaker of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmRole {
    User,
    Assistant,
}

impl LlmRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmRole::User => "user",
            LlmRole::Assistant => "assistant",
        }
    }
}

/// One chat turn sent to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: LlmRole,
    pub content: String,
}

impl LlmMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: LlmRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: LlmRole::Assistant,
            content: content.into(),
        }
    }
}

/// Completion request: ordered history plus sampling parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier; empty falls back to the service default
    pub model: String,
    pub messages: Vec<LlmMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

/// Completion result
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: i32,
    pub output_tokens: i32,
    pub stop_reason: String,
}

/// Completion provider
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    /// Generate a reply for the given history
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Model used when a request does not name one
    fn default_model(&self) -> &str;
}

/// Completion provider configuration
#[derive(Clone)]
pub struct LlmConfig {
    /// Provider (openai, mock)
    pub provider: String,
    pub api_key: String,
    /// Override for the provider endpoint (proxies, test servers)
    pub base_url: Option<String>,
    pub default_model: String,
    pub max_tokens: u32,
}

impl LlmConfig {
    pub fn new(provider: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            api_key: api_key.into(),
            base_url: None,
            default_model: "gpt-4".to_string(),
            max_tokens: 1000,
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// LLM service factory
pub struct LlmServiceFactory;

impl LlmServiceFactory {
    /// Create a completion service based on configuration
    pub fn create(config: LlmConfig) -> Result<Box<dyn LlmService>, LlmError> {
        match config.provider.as_str() {
            "openai" => {
                if config.api_key.trim().is_empty() {
                    return Err(LlmError::Configuration(
                        "OPENAI_API_KEY is required for the openai provider".to_string(),
                    ));
                }
                tracing::info!(default_model = %config.default_model, "Creating OpenAI completion service");
                Ok(Box::new(openai::OpenAiService::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock completion service");
                Ok(Box::new(mock::MockLlmService::new()))
            }
            provider => Err(LlmError::Configuration(format!(
                "Unknown LLM provider: {}. Supported providers: openai, mock",
                provider
            ))),
        }
    }
}
