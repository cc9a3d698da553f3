//! Axum HTTP API server.
//!
//! This crate provides:
//! - The job-board REST surface (auth, jobs, applications, notifications,
//!   admin)
//! - JWT session verification and role gates
//! - Rate limiting and security headers
//! - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{LifecycleService, NotificationDispatcher};
pub use state::AppState;
