//! Error types for the pairing server
//!
//! Defines application-level errors and message send errors.
//! Uses thiserror for ergonomic error definitions.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::types::UserId;

/// Application-level errors
///
/// Covers the broken actor channel, startup configuration and the
/// pairing domain errors. Only `InvalidInput` ever reaches a client as an
/// error; the rest are logged or turned into `auth_failed`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// `PORT` is not a valid port number
    #[error("Invalid PORT value: {0}")]
    InvalidPort(String),

    /// Display name empty after trimming
    #[error("username required")]
    InvalidInput,

    /// Identity was never issued by login
    #[error("Unknown identity: {0}")]
    UnknownIdentity(UserId),

    /// Pairing precondition violated
    #[error("User {0} already has a partner")]
    AlreadyPaired(UserId),
}

/// HTTP mapping for the login endpoint
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidInput => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Message send errors
///
/// Occurs when a message cannot be queued for a socket.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The socket's outbound buffer is full; message dropped
    #[error("Channel full")]
    ChannelFull,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_is_bad_request() {
        let response = AppError::InvalidInput.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_errors_are_500() {
        let response = AppError::ChannelSend.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_only_invalid_input_is_a_client_error() {
        for err in [
            AppError::UnknownIdentity(UserId::new()),
            AppError::AlreadyPaired(UserId::new()),
            AppError::InvalidPort("x".to_string()),
        ] {
            assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
