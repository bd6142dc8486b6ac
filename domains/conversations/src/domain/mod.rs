//! Conversations domain layer: entities and the chat orchestrator

pub mod entities;
pub mod service;
