use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    HistogramVec, IntCounter, IntCounterVec, IntGauge,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Responder Metrics
    pub static ref ERRORS_HANDLED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "errors_handled_total",
        "Total errors converted into response envelopes",
        &["category"]
    )
    .unwrap();

    pub static ref PANICS_CAUGHT_TOTAL: IntCounter = register_int_counter!(
        "panics_caught_total",
        "Total handler panics converted into response envelopes"
    )
    .unwrap();

    // Business Metrics
    pub static ref USERS_TOTAL: IntGauge = register_int_gauge!(
        "users_total",
        "Number of registered accounts"
    )
    .unwrap();
}

/// Initialize all metrics (called on startup)
pub fn init_metrics() {
    // Force lazy_static initialization
    lazy_static::initialize(&HTTP_REQUESTS_TOTAL);
    lazy_static::initialize(&HTTP_REQUEST_DURATION_SECONDS);
    lazy_static::initialize(&ERRORS_HANDLED_TOTAL);
    lazy_static::initialize(&PANICS_CAUGHT_TOTAL);
    lazy_static::initialize(&USERS_TOTAL);
}
