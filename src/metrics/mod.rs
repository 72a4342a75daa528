pub mod middleware;
pub mod registry;

use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, TextEncoder};

use crate::errors::AppError;

/// Handler for the /metrics endpoint
/// Returns metrics in Prometheus exposition format
pub async fn metrics_handler() -> Result<Response, AppError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::unknown(format!("Failed to encode metrics: {}", e)))?;
    let body = String::from_utf8(buffer)
        .map_err(|e| AppError::unknown(format!("Metrics output is not UTF-8: {}", e)))?;

    Ok((
        StatusCode::OK,
        [(CONTENT_TYPE, encoder.format_type().to_string())],
        body,
    )
        .into_response())
}

// Re-export commonly used metrics for convenience
pub use registry::{
    ERRORS_HANDLED_TOTAL, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS,
    PANICS_CAUGHT_TOTAL, USERS_TOTAL,
};
