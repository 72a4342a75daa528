use utoipa::OpenApi;

use crate::api::handlers::{ErrorEnvelope, MessageEnvelope, UserEnvelope};
use crate::errors::{ErrorCategory, FieldValidationError, ValidationResult};
use crate::models::user::{
    LoginRequest, RegisterRequest, UpdateUserRequest, UserStatusRequest, UserView,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Error Responder",
        version = "0.1.0",
        description = "Admin account API whose failures are all reported through one uniform envelope: {code, message, data}. Missing entities answer 404, every other failure answers 400.",
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::register_user,
        crate::api::handlers::get_user,
        crate::api::handlers::update_user,
        crate::api::handlers::set_user_status,
        crate::api::handlers::delete_user,
        crate::api::handlers::login,
    ),
    components(
        schemas(
            UserView,
            UserEnvelope,
            ErrorEnvelope,
            MessageEnvelope,
            RegisterRequest,
            LoginRequest,
            UpdateUserRequest,
            UserStatusRequest,
            ErrorCategory,
            FieldValidationError,
            ValidationResult,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Account management endpoints"),
        (name = "auth", description = "Credential check endpoints"),
    )
)]
pub struct ApiDoc;
