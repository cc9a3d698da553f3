//! Firestore-backed document store for the JobGrid backend.
//!
//! This crate provides:
//! - A Firestore REST client with token caching and retry
//! - Typed repositories for users, jobs, applications and notifications
//! - The persisted-layout contract: applications embed their message
//!   thread and offer letter; uniqueness constraints ride on document ids

pub mod applications;
pub mod client;
pub mod error;
pub mod jobs;
pub mod metrics;
pub mod notifications;
pub mod retry;
pub mod token_cache;
pub mod types;
pub mod users;

pub use applications::ApplicationRepository;
pub use client::{StoreClient, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use jobs::JobRepository;
pub use notifications::NotificationRepository;
pub use types::{Document, FromDocValue, ToDocValue, Value};
pub use users::{StoredUser, UserRepository};
