//! Mock LLM Service Implementation
//!
//! Used by `LlmServiceFactory` when provider is `"mock"`. Returns
//! deterministic replies, records every request for assertions and can be
//! switched into a failing mode. Thread-safe via `Arc<Mutex<>>`.

use std::sync::{Arc, Mutex};

use crate::{CompletionRequest, CompletionResponse, LlmError, LlmService};

/// Mock LLM service for testing
#[derive(Debug, Clone, Default)]
pub struct MockLlmService {
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockLlmService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with the given message
    pub fn fail_with(&self, message: impl Into<String>) {
        *self
            .failure
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(message.into());
    }

    /// Return to producing replies
    pub fn recover(&self) {
        *self
            .failure
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// All requests received so far, in call order
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The reply produced for a given final user turn
    pub fn reply_for(last_message: &str) -> String {
        format!("Mock response to: {}", last_message)
    }
}

#[async_trait::async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        tracing::info!(turns = request.messages.len(), "Mock LLM service processing completion request");

        self.requests
            .lock()
            .map_err(|e| LlmError::Request(format!("requests lock poisoned: {e}")))?
            .push(request.clone());

        let failure = self
            .failure
            .lock()
            .map_err(|e| LlmError::Request(format!("failure lock poisoned: {e}")))?
            .clone();
        if let Some(message) = failure {
            return Err(LlmError::Response(message));
        }

        let model = if request.model.is_empty() {
            "mock-model".to_string()
        } else {
            request.model
        };

        let last_message = request
            .messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or("empty");

        let content = Self::reply_for(last_message);
        let input_tokens = request
            .messages
            .iter()
            .map(|m| m.content.len() as i32 / 4)
            .sum::<i32>();
        let output_tokens = content.len() as i32 / 4;

        Ok(CompletionResponse {
            content,
            model,
            input_tokens,
            output_tokens,
            stop_reason: "stop".to_string(),
        })
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}
