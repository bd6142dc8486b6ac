//! Identity types

use serde::Serialize;

/// Verified identity of the caller.
///
/// `uid` is opaque: it is whatever subject the identity provider issues and
/// is stored verbatim as the owner of conversations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    pub name: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
