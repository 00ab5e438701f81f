pub use metrics::*;
use std::sync::LazyLock;

pub static HTTP_API_PATHS_TOTAL: LazyLock<Result<IntCounterVec>> = LazyLock::new(|| {
    try_create_int_counter_vec(
        "http_api_paths_total",
        "Count of HTTP requests received",
        &["path"],
    )
});
pub static HTTP_API_STATUS_CODES_TOTAL: LazyLock<Result<IntCounterVec>> = LazyLock::new(|| {
    try_create_int_counter_vec(
        "http_api_status_codes_total",
        "Count of HTTP status codes returned",
        &["status"],
    )
});
pub static HTTP_API_PATHS_TIMES: LazyLock<Result<HistogramVec>> = LazyLock::new(|| {
    try_create_histogram_vec(
        "http_api_paths_times",
        "Duration to process HTTP requests per path",
        &["path"],
    )
});

/*
 * Pool admissions
 */
pub static POOL_SUBMISSIONS_TOTAL: LazyLock<Result<IntCounterVec>> = LazyLock::new(|| {
    try_create_int_counter_vec(
        "http_api_pool_submissions_total",
        "Count of objects submitted to the operation pool, by kind and outcome",
        &["kind", "outcome"],
    )
});
pub static POOL_BROADCASTS_TOTAL: LazyLock<Result<IntCounterVec>> = LazyLock::new(|| {
    try_create_int_counter_vec(
        "http_api_pool_broadcasts_total",
        "Count of admitted objects handed to the network for broadcast",
        &["kind"],
    )
});
pub static POOL_SUBMISSION_TIMES: LazyLock<Result<HistogramVec>> = LazyLock::new(|| {
    try_create_histogram_vec(
        "http_api_pool_submission_seconds",
        "Time taken to validate, pool and broadcast a submitted object",
        &["kind"],
    )
});
