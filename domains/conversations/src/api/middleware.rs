//! Conversations domain state and auth backend integration

use axum::extract::FromRef;
use chatrelay_auth::AuthBackend;

use crate::domain::service::ConversationService;

/// Application state for the Conversations domain
#[derive(Clone)]
pub struct ConversationsState {
    pub service: ConversationService,
    pub auth: AuthBackend,
}

impl ConversationsState {
    pub fn new(service: ConversationService, auth: AuthBackend) -> Self {
        Self { service, auth }
    }
}

impl FromRef<ConversationsState> for AuthBackend {
    fn from_ref(state: &ConversationsState) -> Self {
        state.auth.clone()
    }
}
