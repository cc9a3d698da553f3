//! API integration tests.
//!
//! These run the real router via `tower::ServiceExt::oneshot` against a
//! state wired to an emulator-mode store client. Only paths that fail
//! before reaching the store are exercised here; live-store flows are
//! covered by the ignored tests in the store crate.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::OnceLock;
use tower::ServiceExt;

use jobgrid_api::auth::issue_token;
use jobgrid_api::{create_router, ApiConfig, AppState};
use jobgrid_models::{Role, UserId};
use jobgrid_store::{StoreClient, StoreConfig};

static METRICS: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

async fn test_state() -> AppState {
    let config = StoreConfig {
        project_id: "jobgrid-test".to_string(),
        database_id: "(default)".to_string(),
        timeout: std::time::Duration::from_secs(2),
        connect_timeout: std::time::Duration::from_secs(1),
        retry: Default::default(),
        emulator_host: Some("localhost:8080".to_string()),
    };
    let client = StoreClient::new(config).await.expect("store client");
    AppState::with_client(ApiConfig::default(), client)
}

async fn test_router() -> axum::Router {
    let handle = METRICS
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("recorder")
        })
        .clone();
    create_router(test_state().await, Some(handle))
}

fn bearer(role: Role) -> String {
    let token = issue_token(&ApiConfig::default(), &UserId::from("test-user"), role)
        .expect("token");
    format!("Bearer {}", token)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert!(headers.contains_key("X-Content-Type-Options"));
    assert!(headers.contains_key("X-Frame-Options"));
    assert!(headers.contains_key("X-Request-ID"));
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/jobs")
                .header("Origin", "http://localhost:3000")
                .header("Access-Control-Request-Method", "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::OK || response.status() == StatusCode::NO_CONTENT
    );
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/notifications")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/profile")
                .header("Authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "name": "Alice",
                        "email": "not-an-email",
                        "password": "longenough",
                        "role": "jobseeker",
                        "phone": "+49 160"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_rejects_admin_role() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "name": "Mallory",
                        "email": "mallory@example.com",
                        "password": "longenough",
                        "role": "admin"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_employer_cannot_apply() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/applications")
                .header("Authorization", bearer(Role::Employer))
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "job_id": "job-1" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_jobseeker_cannot_post_jobs() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/jobs")
                .header("Authorization", bearer(Role::JobSeeker))
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "title": "T",
                        "description": "D",
                        "job_type": "Full-time",
                        "location": "Remote",
                        "salary_range": { "min": 1, "max": 2 }
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_status_value_is_bad_request() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/applications/job-1__seeker-1/status")
                .header("Authorization", bearer(Role::Employer))
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "status": "Withdrawn" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_surface_is_gated() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/admin/stats")
                .header("Authorization", bearer(Role::Employer))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
