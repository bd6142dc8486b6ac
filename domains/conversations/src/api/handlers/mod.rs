//! HTTP handlers for the Conversations domain

pub mod chat;
pub mod conversations;
pub mod messages;

use chatrelay_common::{Error, Result};
use uuid::Uuid;

/// Parse a conversation id path segment; malformed ids are simply unknown
pub(crate) fn parse_conversation_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| Error::conversation_not_found())
}
