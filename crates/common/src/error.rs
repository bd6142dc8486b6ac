//! Common error types and handling for Chatrelay

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::db::StoreError;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Error type surfaced at the request boundary
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Storage(#[from] StoreError),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Authentication(_) => StatusCode::UNAUTHORIZED,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Storage(_) | Error::Completion(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short machine-readable label, used in logs only
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Storage(_) => "storage",
            Error::Completion(_) => "completion",
            Error::Authentication(_) => "authentication",
            Error::Validation(_) => "validation",
            Error::NotFound(_) => "not_found",
            Error::Internal(_) => "internal",
        }
    }

    /// Ownership-check failure; never distinguishes "absent" from "foreign"
    pub fn conversation_not_found() -> Self {
        Error::NotFound("Conversation not found".to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log internal errors with full context
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, kind = self.kind(), "Internal server error");
        }

        let body = Json(json!({ "detail": self.to_string() }));

        (status, body).into_response()
    }
}
