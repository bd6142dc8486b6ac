//! Shared configuration, error handling, and extractors for Chatrelay
//!
//! This crate provides common functionality used across the Chatrelay workspace:
//! - Configuration management following 12-factor principles
//! - The request-boundary error type and its HTTP rendering
//! - Store error type shared by every persistence backend
//! - Validating JSON extractor

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;

pub use config::Config;
pub use db::StoreError;
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
