//! Shared data models for the JobGrid backend.
//!
//! This crate provides Serde-serializable types for:
//! - User accounts and roles
//! - Job postings and search filters
//! - Applications with their status state machine, message threads and
//!   offer letters
//! - Notifications

pub mod application;
pub mod ids;
pub mod job;
pub mod notification;
pub mod role;
pub mod user;

// Re-export common types
pub use application::{
    Actor, Application, ApplicationStatus, Message, MessageType, OfferLetter, OfferStatus,
    TransitionError,
};
pub use ids::{ApplicationId, JobId, NotificationId, UserId};
pub use job::{JobFilter, JobPosting, JobState, JobType, SalaryRange};
pub use notification::{message_preview, Notification, MESSAGE_PREVIEW_LEN};
pub use role::Role;
pub use user::UserProfile;
