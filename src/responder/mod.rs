//! Terminal error handler
//!
//! [`Responder::respond`] turns any [`AppError`] into an [`Envelope`] and
//! logs it exactly once. It never fails: anything it cannot format falls
//! back to the generic failure envelope.
//!
//! Handlers return `Result<_, AppError>`; the `IntoResponse` impl below
//! routes the error through the process-wide responder installed at
//! startup with [`Responder::install`].

pub mod extract;
pub mod panic;

use axum::response::{IntoResponse, Response};
use std::sync::OnceLock;
use tracing::error;

use crate::config::ResponderConfig;
use crate::errors::{AppError, Envelope, ErrorCategory, ValidationResult};
use crate::metrics::ERRORS_HANDLED_TOTAL;

pub use extract::ValidatedJson;
pub use panic::handle_panic;

static GLOBAL: OnceLock<Responder> = OnceLock::new();

#[derive(Debug, Clone, Default)]
pub struct Responder {
    config: ResponderConfig,
}

impl Responder {
    pub fn new(config: ResponderConfig) -> Self {
        Self { config }
    }

    /// Install the responder used by `AppError::into_response`.
    ///
    /// Returns `false` if one was already installed; the first one wins.
    pub fn install(config: ResponderConfig) -> bool {
        GLOBAL.set(Self::new(config)).is_ok()
    }

    /// The installed responder, or one with default literals
    pub fn global() -> &'static Responder {
        GLOBAL.get_or_init(Responder::default)
    }

    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    /// Map `err` to its envelope and log it
    pub fn respond(&self, err: &AppError) -> Envelope {
        let category = err.category();
        ERRORS_HANDLED_TOTAL
            .with_label_values(&[category.as_str()])
            .inc();

        let envelope = match err {
            AppError::BadCredentials(message) => {
                Envelope::fail(category, self.credentials_message(message))
            }
            AppError::ValidationFailure(result) => Self::validation_envelope(result),
            AppError::Unknown(_)
            | AppError::BadRequest { .. }
            | AppError::EntityExists(_)
            | AppError::EntityNotFound(_) => Envelope::fail(category, err.to_string()),
        };

        if category.logs_trace() {
            error!(category = %category, "{}", err.trace());
        } else {
            error!(category = %category, "{}", envelope.message);
        }

        envelope
    }

    fn credentials_message<'a>(&'a self, message: &'a str) -> &'a str {
        if message == self.config.bad_credentials_marker {
            self.config.bad_credentials_message.as_str()
        } else {
            message
        }
    }

    /// Only the first error is surfaced, in the order the result lists them.
    fn validation_envelope(result: &ValidationResult) -> Envelope {
        match result.first() {
            Some(first) => Envelope::fail(ErrorCategory::ValidationFailure, first.client_message()),
            None => Envelope::fail(ErrorCategory::Unknown, ""),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        Responder::global().respond(&self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{FieldValidationError, DEFAULT_FAILURE_STATUS, FALLBACK_MESSAGE};
    use axum::http::StatusCode;
    use std::fmt;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::{layer::Context, prelude::*, Layer};

    /// Counts error-level events emitted while it is the default subscriber
    #[derive(Clone, Default)]
    struct ErrorEventCounter {
        count: Arc<AtomicUsize>,
    }

    impl<S: Subscriber> Layer<S> for ErrorEventCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::ERROR {
                self.count.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn respond_counting(err: &AppError) -> (Envelope, usize) {
        let counter = ErrorEventCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        let envelope = tracing::subscriber::with_default(subscriber, || {
            Responder::default().respond(err)
        });
        (envelope, counter.count.load(Ordering::SeqCst))
    }

    /// Records the text of every error-level event
    #[derive(Clone, Default)]
    struct ErrorMessageRecorder {
        messages: Arc<Mutex<Vec<String>>>,
    }

    struct MessageVisitor<'a>(&'a mut String);

    impl Visit for MessageVisitor<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                *self.0 = format!("{:?}", value);
            }
        }
    }

    impl<S: Subscriber> Layer<S> for ErrorMessageRecorder {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::ERROR {
                let mut message = String::new();
                event.record(&mut MessageVisitor(&mut message));
                self.messages.lock().unwrap().push(message);
            }
        }
    }

    fn respond_recording(err: &AppError) -> Vec<String> {
        let recorder = ErrorMessageRecorder::default();
        let subscriber = tracing_subscriber::registry().with(recorder.clone());
        tracing::subscriber::with_default(subscriber, || Responder::default().respond(err));
        let messages = recorder.messages.lock().unwrap().clone();
        messages
    }

    fn all_categories() -> Vec<AppError> {
        vec![
            AppError::unknown("boom"),
            AppError::bad_credentials("bad credentials"),
            AppError::bad_request("cannot delete the admin account"),
            AppError::entity_exists("User", "username", "alice"),
            AppError::EntityNotFound("user 42 missing".into()),
            AppError::validation(ValidationResult::new(vec![FieldValidationError::field(
                "email",
                "must not be blank",
            )])),
        ]
    }

    #[test]
    fn test_every_category_yields_message_and_one_log() {
        for err in all_categories() {
            let (envelope, logs) = respond_counting(&err);
            assert!(!envelope.message.is_empty(), "{:?}", err);
            assert!(envelope.data.is_none());
            assert_eq!(logs, 1, "{:?}", err);
        }
    }

    #[test]
    fn test_entity_not_found_is_404() {
        let (envelope, _) = respond_counting(&AppError::EntityNotFound("user 42 missing".into()));
        assert_eq!(envelope.status, 404);
        assert_eq!(envelope.message, "user 42 missing");
    }

    #[test]
    fn test_other_categories_use_default_status() {
        for err in all_categories() {
            if err.category() == ErrorCategory::EntityNotFound {
                continue;
            }
            let (envelope, _) = respond_counting(&err);
            assert_eq!(envelope.status, DEFAULT_FAILURE_STATUS);
        }
    }

    #[test]
    fn test_bad_credentials_marker_is_replaced() {
        let (envelope, _) = respond_counting(&AppError::bad_credentials("bad credentials"));
        assert_eq!(envelope.message, "incorrect username or password");
    }

    #[test]
    fn test_bad_credentials_other_message_passes_through() {
        let (envelope, _) = respond_counting(&AppError::bad_credentials("Bad credentials"));
        assert_eq!(envelope.message, "Bad credentials");

        let (envelope, _) = respond_counting(&AppError::bad_credentials("account disabled"));
        assert_eq!(envelope.message, "account disabled");
    }

    #[test]
    fn test_bad_credentials_logs_plain_message() {
        let logged = respond_recording(&AppError::bad_credentials("bad credentials"));
        assert_eq!(logged, vec!["incorrect username or password".to_string()]);
    }

    #[test]
    fn test_other_categories_log_cause_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let logged = respond_recording(&AppError::bad_request_with_source("upload rejected", io));
        assert_eq!(logged.len(), 1);
        assert!(logged[0].starts_with("BAD_REQUEST: upload rejected"));
        assert!(logged[0].contains("Caused by: disk on fire"));
    }

    #[test]
    fn test_bad_credentials_uses_configured_literals() {
        let responder = Responder::new(ResponderConfig {
            bad_credentials_marker: "坏的凭证".to_string(),
            bad_credentials_message: "用户名或密码不正确".to_string(),
        });
        let envelope = responder.respond(&AppError::bad_credentials("坏的凭证"));
        assert_eq!(envelope.message, "用户名或密码不正确");

        let envelope = responder.respond(&AppError::bad_credentials("bad credentials"));
        assert_eq!(envelope.message, "bad credentials");
    }

    #[test]
    fn test_validation_field_error_is_prefixed() {
        let err = AppError::validation(ValidationResult::new(vec![FieldValidationError::field(
            "email",
            "must not be blank",
        )]));
        let (envelope, _) = respond_counting(&err);
        assert_eq!(envelope.message, "email: must not be blank");
        assert_eq!(envelope.status, DEFAULT_FAILURE_STATUS);
    }

    #[test]
    fn test_validation_object_error_is_unmodified() {
        let err = AppError::validation(ValidationResult::new(vec![FieldValidationError::object(
            "passwords do not match",
        )]));
        let (envelope, _) = respond_counting(&err);
        assert_eq!(envelope.message, "passwords do not match");
    }

    #[test]
    fn test_validation_surfaces_only_first_error() {
        let err = AppError::validation(ValidationResult::new(vec![
            FieldValidationError::field("username", "length must be between 3 and 32"),
            FieldValidationError::field("email", "must not be blank"),
        ]));
        let (envelope, logs) = respond_counting(&err);
        assert_eq!(envelope.message, "username: length must be between 3 and 32");
        assert_eq!(logs, 1);
    }

    #[test]
    fn test_nested_validation_error_keeps_field_path() {
        use validator::Validate;

        #[derive(Debug, Validate)]
        struct Contact {
            #[validate(length(min = 1, message = "must not be blank"))]
            name: String,
        }

        #[derive(Debug, Validate)]
        struct Invite {
            #[validate(nested)]
            contact: Contact,
        }

        let errors = Invite {
            contact: Contact {
                name: String::new(),
            },
        }
        .validate()
        .unwrap_err();

        let (envelope, logs) = respond_counting(&AppError::from(errors));
        assert_ne!(envelope.message, FALLBACK_MESSAGE);
        assert_eq!(envelope.message, "contact.name: must not be blank");
        assert_eq!(envelope.status, DEFAULT_FAILURE_STATUS);
        assert_eq!(logs, 1);
    }

    #[test]
    fn test_empty_validation_falls_back_to_generic() {
        let (envelope, logs) = respond_counting(&AppError::validation(ValidationResult::default()));
        assert_eq!(envelope.status, DEFAULT_FAILURE_STATUS);
        assert_eq!(envelope.message, FALLBACK_MESSAGE);
        assert_eq!(logs, 1);
    }

    #[test]
    fn test_unknown_uses_top_level_message() {
        let err: AppError = anyhow::anyhow!("socket closed")
            .context("failed to refresh session")
            .into();
        let (envelope, _) = respond_counting(&err);
        assert_eq!(envelope.message, "failed to refresh session");
    }

    #[test]
    fn test_empty_message_falls_back() {
        let (envelope, _) = respond_counting(&AppError::bad_request(""));
        assert_eq!(envelope.message, FALLBACK_MESSAGE);
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::EntityNotFound("gone".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::entity_exists("Role", "name", "ops").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_concurrent_invocations_are_independent() {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                std::thread::spawn(move || {
                    let err = AppError::EntityNotFound(format!("user {} missing", i));
                    Responder::default().respond(&err)
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let envelope = handle.join().unwrap();
            assert_eq!(envelope.status, 404);
            assert_eq!(envelope.message, format!("user {} missing", i));
        }
    }
}
