use axum::response::{IntoResponse, Response};
use std::any::Any;

use super::Responder;
use crate::errors::AppError;
use crate::metrics::PANICS_CAUGHT_TOTAL;

/// Client-facing message for every caught panic
pub const PANIC_MESSAGE: &str = "handler panicked";

/// Convert a handler panic into an `Unknown` envelope.
///
/// The payload only reaches the log, as the cause under [`PANIC_MESSAGE`].
/// Plug into `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    PANICS_CAUGHT_TOTAL.inc();

    Responder::global()
        .respond(&panic_error(payload.as_ref()))
        .into_response()
}

fn panic_error(payload: &(dyn Any + Send)) -> AppError {
    let cause = match panic_message(payload) {
        Some(message) => anyhow::Error::msg(message),
        None => anyhow::Error::msg("non-string panic payload"),
    };
    AppError::Unknown(cause.context(PANIC_MESSAGE))
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        Some(s.to_string())
    } else {
        payload.downcast_ref::<String>().cloned()
    }
}
