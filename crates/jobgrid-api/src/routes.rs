//! API routes.

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::admin::{create_jobseeker, get_stats, list_users};
use crate::handlers::applications::{
    apply, get_messages, job_applicants, my_applications, send_message, send_offer, update_status,
};
use crate::handlers::auth::{get_profile, login, register, update_profile};
use crate::handlers::jobs::{create_job, delete_job, get_job, list_jobs, my_jobs, update_job};
use crate::handlers::notifications::{list_notifications, mark_all_read, mark_read};
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/profile", get(get_profile))
        .route("/auth/profile", put(update_profile));

    let job_routes = Router::new()
        // Public catalog
        .route("/jobs", get(list_jobs))
        .route("/jobs", post(create_job))
        // Employer's own postings; registered before /jobs/:id so the
        // literal segment wins
        .route("/jobs/employer/my-jobs", get(my_jobs))
        .route("/jobs/:id", get(get_job))
        .route("/jobs/:id", put(update_job))
        .route("/jobs/:id", delete(delete_job));

    let application_routes = Router::new()
        .route("/applications", post(apply))
        .route("/applications/my-applications", get(my_applications))
        .route("/applications/job/:job_id", get(job_applicants))
        .route("/applications/:id/status", put(update_status))
        .route("/applications/:id/messages", post(send_message))
        .route("/applications/:id/messages", get(get_messages))
        .route("/applications/:id/offer", post(send_offer));

    let notification_routes = Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/read-all", put(mark_all_read))
        .route("/notifications/:id/read", put(mark_read));

    let admin_routes = Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/stats", get(get_stats))
        .route("/admin/jobseeker", post(create_jobseeker));

    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(job_routes)
        .merge(application_routes)
        .merge(notification_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
