//! Domain services sitting between handlers and repositories.

pub mod lifecycle;
pub mod notify;

pub use lifecycle::LifecycleService;
pub use notify::NotificationDispatcher;
