use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Status used by every failure envelope that does not override it
pub const DEFAULT_FAILURE_STATUS: u16 = 400;

/// Status carried by success envelopes
pub const SUCCESS_STATUS: u16 = 200;

/// Category of a raised error, used to pick the mapping rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Anything not covered by a more specific category
    Unknown,

    /// Login rejected by the credential check
    BadCredentials,

    /// Request refused by application logic
    BadRequest,

    /// Entity with the same key already exists
    EntityExists,

    /// Requested entity does not exist
    EntityNotFound,

    /// Bound input failed field or object validation
    ValidationFailure,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 6] = [
        Self::Unknown,
        Self::BadCredentials,
        Self::BadRequest,
        Self::EntityExists,
        Self::EntityNotFound,
        Self::ValidationFailure,
    ];

    /// Stable label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::BadCredentials => "BAD_CREDENTIALS",
            Self::BadRequest => "BAD_REQUEST",
            Self::EntityExists => "ENTITY_EXISTS",
            Self::EntityNotFound => "ENTITY_NOT_FOUND",
            Self::ValidationFailure => "VALIDATION_FAILURE",
        }
    }

    /// Envelope status for this category
    pub fn status_code(&self) -> u16 {
        match self {
            Self::EntityNotFound => 404,
            Self::Unknown
            | Self::BadCredentials
            | Self::BadRequest
            | Self::EntityExists
            | Self::ValidationFailure => DEFAULT_FAILURE_STATUS,
        }
    }

    /// Whether the handler logs the full cause chain rather than just the message
    pub fn logs_trace(&self) -> bool {
        !matches!(self, Self::BadCredentials)
    }
}
