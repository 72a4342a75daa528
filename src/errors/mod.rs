//! Error taxonomy and the uniform response envelope
//!
//! Every failure a request handler can raise is an [`AppError`]. Its
//! [`ErrorCategory`] decides how the responder turns it into an [`Envelope`].

pub mod codes;
pub mod response;
pub mod validation;

use axum::extract::rejection::{JsonRejection, PathRejection};
use std::fmt;

pub use codes::{ErrorCategory, DEFAULT_FAILURE_STATUS};
pub use response::{Envelope, FALLBACK_MESSAGE};
pub use validation::{FieldValidationError, ValidationResult};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Catch-all for unexpected failures
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),

    #[error("{0}")]
    BadCredentials(String),

    #[error("{message}")]
    BadRequest {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{0}")]
    EntityExists(String),

    #[error("{0}")]
    EntityNotFound(String),

    #[error("{0}")]
    ValidationFailure(ValidationResult),
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Unknown(_) => ErrorCategory::Unknown,
            Self::BadCredentials(_) => ErrorCategory::BadCredentials,
            Self::BadRequest { .. } => ErrorCategory::BadRequest,
            Self::EntityExists(_) => ErrorCategory::EntityExists,
            Self::EntityNotFound(_) => ErrorCategory::EntityNotFound,
            Self::ValidationFailure(_) => ErrorCategory::ValidationFailure,
        }
    }

    pub fn unknown(message: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Unknown(anyhow::Error::msg(message))
    }

    pub fn bad_credentials(message: impl Into<String>) -> Self {
        Self::BadCredentials(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            source: None,
        }
    }

    pub fn bad_request_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::BadRequest {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// `"<Entity> with <field> <value> existed"`
    pub fn entity_exists(entity: &str, field: &str, value: impl fmt::Display) -> Self {
        Self::EntityExists(format!("{} with {} {} existed", entity, field, value))
    }

    /// `"<Entity> with <field> <value> does not exist"`
    pub fn entity_not_found(entity: &str, field: &str, value: impl fmt::Display) -> Self {
        Self::EntityNotFound(format!("{} with {} {} does not exist", entity, field, value))
    }

    pub fn validation(result: impl Into<ValidationResult>) -> Self {
        Self::ValidationFailure(result.into())
    }

    /// Full diagnostic text: the error followed by its cause chain
    pub fn trace(&self) -> String {
        match self {
            // anyhow already renders the chain (and a backtrace when captured)
            Self::Unknown(err) => format!("{:?}", err),
            other => {
                let mut out = format!("{}: {}", other.category(), other);
                let mut source = std::error::Error::source(other);
                while let Some(cause) = source {
                    out.push_str(&format!("\nCaused by: {}", cause));
                    source = std::error::Error::source(cause);
                }
                out
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationFailure(err.into())
    }
}

/// Malformed or mistyped JSON bodies are the caller's fault.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = format!("Invalid request body: {}", rejection.body_text());
        Self::bad_request_with_source(message, rejection)
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        let message = format!("Invalid path parameter: {}", rejection.body_text());
        Self::bad_request_with_source(message, rejection)
    }
}
