//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "jobgrid_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "jobgrid_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "jobgrid_http_requests_in_flight";

    // Domain metrics
    pub const APPLICATIONS_CREATED_TOTAL: &str = "jobgrid_applications_created_total";
    pub const STATUS_CHANGES_TOTAL: &str = "jobgrid_status_changes_total";
    pub const MESSAGES_SENT_TOTAL: &str = "jobgrid_messages_sent_total";
    pub const OFFERS_SENT_TOTAL: &str = "jobgrid_offers_sent_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "jobgrid_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a filed application.
pub fn record_application_created() {
    counter!(names::APPLICATIONS_CREATED_TOTAL).increment(1);
}

/// Record a status change.
pub fn record_status_change(target: &str) {
    let labels = [("target", target.to_string())];
    counter!(names::STATUS_CHANGES_TOTAL, &labels).increment(1);
}

/// Record a message sent on an application thread.
pub fn record_message_sent(message_type: &str) {
    let labels = [("type", message_type.to_string())];
    counter!(names::MESSAGES_SENT_TOTAL, &labels).increment(1);
}

/// Record an offer letter sent.
pub fn record_offer_sent() {
    counter!(names::OFFERS_SENT_TOTAL).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels (collapse document ids).
fn sanitize_path(path: &str) -> String {
    // UUIDs first, then the composite application ids, then bare ids
    let path = regex_lite::Regex::new(
        r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
    )
    .unwrap()
    .replace_all(path, ":id");
    let path = regex_lite::Regex::new(r"/applications/[A-Za-z0-9_:-]+__[A-Za-z0-9_:-]+")
        .unwrap()
        .replace_all(&path, "/applications/:application_id");
    let path = regex_lite::Regex::new(r"/jobs/(?:[A-Za-z0-9_:-]+)(/|$)")
        .unwrap()
        .replace_all(&path, "/jobs/:job_id$1");
    let path = regex_lite::Regex::new(r"/notifications/[A-Za-z0-9_:-]+/read")
        .unwrap()
        .replace_all(&path, "/notifications/:notification_id/read");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_collapses_application_ids() {
        assert_eq!(
            sanitize_path("/api/applications/job-7__seeker-12/messages"),
            "/api/applications/:application_id/messages"
        );
    }

    #[test]
    fn test_sanitize_path_collapses_job_ids() {
        assert_eq!(
            sanitize_path("/api/jobs/550e8400-e29b-41d4-a716-446655440000"),
            "/api/jobs/:job_id"
        );
        assert_eq!(sanitize_path("/api/jobs/some-job-id"), "/api/jobs/:job_id");
    }

    #[test]
    fn test_sanitize_path_collapses_notification_ids() {
        assert_eq!(
            sanitize_path("/api/notifications/abc-123/read"),
            "/api/notifications/:notification_id/read"
        );
    }
}
