use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Stored account record
#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub nickname: String,
    pub email: String,
    /// Argon2 PHC string (salt included)
    pub password_hash: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Account as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserView {
    pub id: u64,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            nickname: user.nickname.clone(),
            email: user.email.clone(),
            enabled: user.enabled,
            created_at: user.created_at,
        }
    }
}

/// Account registration body
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "password_excludes_username"))]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32, message = "length must be between 3 and 32"))]
    pub username: String,
    #[validate(email(message = "must be a well-formed email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "length must be at least 6"))]
    pub password: String,
    #[validate(length(max = 32, message = "length must be at most 32"))]
    pub nickname: Option<String>,
}

fn password_excludes_username(req: &RegisterRequest) -> Result<(), ValidationError> {
    if req
        .password
        .to_lowercase()
        .contains(&req.username.to_lowercase())
    {
        let mut err = ValidationError::new("password_contains_username");
        err.message = Some("password must not contain the username".into());
        return Err(err);
    }
    Ok(())
}

/// Login body
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub username: String,
    #[validate(length(min = 1, message = "must not be blank"))]
    pub password: String,
}

/// Profile update body
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 32, message = "length must be between 1 and 32"))]
    pub nickname: String,
}

/// Account status body
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UserStatusRequest {
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationResult;

    fn register(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            nickname: None,
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(register("alice", "alice@example.com", "s3cret!").validate().is_ok());
    }

    #[test]
    fn test_invalid_email_is_field_error() {
        let errors = register("alice", "not-an-email", "s3cret!")
            .validate()
            .unwrap_err();
        let result = ValidationResult::from(errors);
        assert_eq!(
            result.first().map(|e| e.client_message()),
            Some("email: must be a well-formed email address".to_string())
        );
    }

    #[test]
    fn test_password_containing_username_is_object_error() {
        let errors = register("alice", "alice@example.com", "alice-rocks")
            .validate()
            .unwrap_err();
        let result = ValidationResult::from(errors);
        let first = result.first().unwrap();
        assert!(!first.is_field_error());
        assert_eq!(first.message, "password must not contain the username");
    }

    #[test]
    fn test_view_hides_credentials() {
        let user = User {
            id: 7,
            username: "bob".to_string(),
            nickname: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$ZGlnZXN0".to_string(),
            enabled: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(UserView::from(&user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "bob");
    }
}
