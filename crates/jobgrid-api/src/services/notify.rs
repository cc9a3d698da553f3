//! Notification dispatch.
//!
//! Notifications are a side effect of an already-persisted message, so
//! delivery is fire-and-forget: a write failure is logged and swallowed,
//! never surfaced to the sender.

use jobgrid_models::Notification;
use jobgrid_store::NotificationRepository;
use tracing::warn;

/// Fire-and-forget notification writer.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifications: NotificationRepository,
}

impl NotificationDispatcher {
    pub fn new(notifications: NotificationRepository) -> Self {
        Self { notifications }
    }

    /// Dispatch a notification in the background.
    pub fn dispatch(&self, notification: Notification) {
        let repo = self.notifications.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.create(&notification).await {
                warn!(
                    "Failed to deliver notification to {}: {}",
                    notification.recipient, e
                );
            }
        });
    }
}
