//! Authentication errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Authentication error; every variant rejects the request with 401
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authorization header required")]
    MissingAuthorization,

    #[error("Invalid authorization header format")]
    InvalidAuthorizationFormat,

    #[error("Invalid or expired token")]
    InvalidToken,

    /// Token verified but carries no email claim
    #[error("Token does not carry an email claim")]
    MissingEmail,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "Request rejected");

        let body = Json(json!({ "detail": self.to_string() }));

        (self.status_code(), body).into_response()
    }
}
