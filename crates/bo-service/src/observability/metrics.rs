//! Metrics definitions for the Back Office service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `bo_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `status`: success, error
//! - `stage`: authentication, authorization
//! - `outcome`: bounded by code
//! - `operation` and `table`: bounded by the schema
//! - `endpoint`: route template, unknown paths collapse to `/other`

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and return the handle served on `/metrics`.
///
/// Must be called before any metric is recorded.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("bo_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("bo_db_query".to_string()),
            &[
                0.001, 0.002, 0.005, 0.010, 0.020, 0.050, 0.100, 0.250, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set DB query buckets: {e}"))?
        // bcrypt at cost 10-14 takes tens to hundreds of milliseconds
        .set_buckets_for_metric(
            Matcher::Prefix("bo_bcrypt".to_string()),
            &[0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.000, 4.000],
        )
        .map_err(|e| format!("Failed to set bcrypt buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record an HTTP request
///
/// Metric: `bo_http_request_duration_seconds`, `bo_http_requests_total`
/// Labels: `method`, `endpoint` (normalized), `status` / `status_code`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("bo_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("bo_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Collapse numeric ids and team names so the endpoint label stays bounded.
fn normalize_endpoint(path: &str) -> String {
    const RESOURCES: [&str; 5] = ["admin", "user", "product", "team", "meeting"];

    match path {
        "/health" | "/metrics" | "/api/user/login" | "/api/user/register" => {
            return path.to_string();
        }
        _ => {}
    }

    let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    match parts.as_slice() {
        ["api", resource] if RESOURCES.contains(resource) => format!("/api/{}", resource),
        ["api", "team", _] => "/api/team/:team".to_string(),
        ["api", resource, _] if RESOURCES.contains(resource) => format!("/api/{}/:id", resource),
        _ => "/other".to_string(),
    }
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record session token issuance duration and outcome
///
/// Metric: `bo_token_issuance_duration_seconds`, `bo_token_issuance_total`
/// Labels: `status`
pub fn record_token_issuance(status: &str, duration: Duration) {
    histogram!("bo_token_issuance_duration_seconds", "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("bo_token_issuance_total", "status" => status.to_string()).increment(1);
}

/// Record token validation result
///
/// Metric: `bo_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    let category = error_category.unwrap_or("none");
    counter!("bo_token_validations_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}

// ============================================================================
// Gate Metrics
// ============================================================================

/// Record an authorization gate decision
///
/// Metric: `bo_gate_decisions_total`
/// Labels: `stage`, `outcome` (allowed, rejected)
pub fn record_gate_decision(stage: &str, outcome: &str) {
    counter!("bo_gate_decisions_total", "stage" => stage.to_string(), "outcome" => outcome.to_string())
        .increment(1);
}

// ============================================================================
// Scheduling Metrics
// ============================================================================

/// Record a meeting scheduling attempt
///
/// Metric: `bo_meeting_schedule_total`
/// Labels: `operation` (create, update, disable), `outcome`
pub fn record_meeting_schedule(operation: &str, outcome: &str) {
    counter!("bo_meeting_schedule_total", "operation" => operation.to_string(), "outcome" => outcome.to_string())
        .increment(1);
}

// ============================================================================
// Database Metrics
// ============================================================================

/// Record database query execution
///
/// Metric: `bo_db_query_duration_seconds`, `bo_db_queries_total`
/// Labels: `operation`, `table`, `status`
pub fn record_db_query(operation: &str, table: &str, status: &str, duration: Duration) {
    histogram!("bo_db_query_duration_seconds", "operation" => operation.to_string(), "table" => table.to_string())
        .record(duration.as_secs_f64());

    counter!("bo_db_queries_total", "operation" => operation.to_string(), "table" => table.to_string(), "status" => status.to_string())
        .increment(1);
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Record a failed operation by error category
///
/// Metric: `bo_errors_total`
/// Labels: `operation`, `error_category`, `status_code`
pub fn record_error(operation: &str, error_category: &str, status_code: u16) {
    counter!(
        "bo_errors_total",
        "operation" => operation.to_string(),
        "error_category" => error_category.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

// ============================================================================
// Crypto Metrics
// ============================================================================

/// Record bcrypt operation duration
///
/// Metric: `bo_bcrypt_duration_seconds`
/// Labels: `operation` (hash, verify)
pub fn record_bcrypt_duration(operation: &str, duration: Duration) {
    histogram!("bo_bcrypt_duration_seconds", "operation" => operation.to_string())
        .record(duration.as_secs_f64());
}
