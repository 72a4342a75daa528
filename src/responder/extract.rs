use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::AppError;

/// JSON body extractor that also runs `validator` rules.
///
/// Bodies that fail to parse become `BadRequest`, bodies that parse but
/// break a rule become `ValidationFailure`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCategory;
    use axum::{body::Body, http::header::CONTENT_TYPE};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Login {
        #[validate(length(min = 1, message = "must not be blank"))]
        username: String,
    }

    fn json_request(body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let ValidatedJson(login) =
            ValidatedJson::<Login>::from_request(json_request(r#"{"username":"alice"}"#), &())
                .await
                .unwrap();
        assert_eq!(login.username, "alice");
    }

    #[tokio::test]
    async fn test_rule_violation_is_validation_failure() {
        let err = ValidatedJson::<Login>::from_request(json_request(r#"{"username":""}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValidationFailure);
        assert_eq!(err.to_string(), "username: must not be blank");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let err = ValidatedJson::<Login>::from_request(json_request("{not json"), &())
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::BadRequest);
        assert!(err.to_string().starts_with("Invalid request body:"));
    }
}
