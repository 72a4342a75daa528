use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::codes::{ErrorCategory, SUCCESS_STATUS};

/// Message used when an error arrives without any text of its own
pub const FALLBACK_MESSAGE: &str = "Internal server error";

/// Uniform response envelope
///
/// `data` is only present on success. Failure envelopes always carry a
/// status and a non-empty message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = ()> {
    /// HTTP-like status code
    #[serde(rename = "code")]
    pub status: u16,
    /// Human-readable message
    pub message: String,
    /// Response payload (success only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Create a success envelope carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            status: SUCCESS_STATUS,
            message: "success".to_string(),
            data: Some(data),
        }
    }
}

impl Envelope {
    /// Create a failure envelope with an explicit status
    pub fn fail_with(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status,
            message: if message.trim().is_empty() {
                FALLBACK_MESSAGE.to_string()
            } else {
                message
            },
            data: None,
        }
    }

    /// Create a failure envelope with the status of `category`
    pub fn fail(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self::fail_with(category.status_code(), message)
    }

    pub fn is_failure(&self) -> bool {
        self.status != SUCCESS_STATUS
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_REQUEST);

        (status, Json(self)).into_response()
    }
}
