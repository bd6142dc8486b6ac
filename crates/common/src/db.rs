//! Shared persistence error type
//!
//! Every store backend (Postgres, Supabase REST, in-memory) reports failures
//! through `StoreError`, which the request boundary renders as a storage error.

use thiserror::Error;

/// Store-specific error types
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Store request failed: {0}")]
    Request(String),

    #[error("Store returned {status}: {body}")]
    Response { status: u16, body: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Store configuration error: {0}")]
    Configuration(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
