//! Client error types

use deskbook_core::DeskbookError;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never produced a response
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Token rejected or expired; the session has been torn down
    #[error("Authentication required")]
    Unauthorized,

    /// No token in the session for an authenticated call
    #[error("Not signed in")]
    MissingToken,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Booking clash and similar state conflicts
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Rejected locally before any request was made
    #[error(transparent)]
    Core(#[from] DeskbookError),
}

/// Result type for client operations
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Map a non-success status and its body
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = payload_message(body);
        match status {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            400 | 422 => ApiError::Validation(message),
            _ => ApiError::Server { status, message },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Transport(_) => "TRANSPORT",
            ApiError::Decode(_) => "DECODE",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::MissingToken => "MISSING_TOKEN",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Validation(_) => "VALIDATION",
            ApiError::Server { .. } => "SERVER",
            ApiError::Core(err) => err.code(),
        }
    }

    /// Errors after which the user must sign in again
    pub fn is_session_error(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::MissingToken)
    }

    /// Text for toasts: the server's payload when there is one
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Forbidden(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message)
            | ApiError::Validation(message)
            | ApiError::Server { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Extract the human-readable part of an error body.
///
/// Accepts `{"message": ".."}`, a bare JSON string, or raw text.
pub fn payload_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("message") {
            Some(serde_json::Value::String(message)) => message.clone(),
            _ => body.trim().to_string(),
        },
        Ok(serde_json::Value::String(message)) => message,
        _ => body.trim().to_string(),
    }
}
