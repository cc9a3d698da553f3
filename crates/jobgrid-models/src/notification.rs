//! Notification records created as message side effects.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::application::MessageType;
use crate::ids::{ApplicationId, NotificationId, UserId};

/// Maximum preview length taken from a text message.
pub const MESSAGE_PREVIEW_LEN: usize = 50;

/// Preview shown for image messages instead of content.
const IMAGE_PREVIEW: &str = "Sent an image";

/// A notification delivered to the counterparty of a message.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Notification {
    pub notification_id: NotificationId,
    pub recipient: UserId,
    pub sender: UserId,
    pub application: ApplicationId,
    /// Truncated preview of the triggering message.
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient: UserId,
        sender: UserId,
        application: ApplicationId,
        message: String,
    ) -> Self {
        Self {
            notification_id: NotificationId::new(),
            recipient,
            sender,
            application,
            message,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

/// Build the notification preview for a message.
///
/// Text previews are the first 50 characters of content (char boundary
/// safe); image messages get a fixed string.
pub fn message_preview(message_type: MessageType, content: &str) -> String {
    match message_type {
        MessageType::Image => IMAGE_PREVIEW.to_string(),
        MessageType::Text => content.chars().take(MESSAGE_PREVIEW_LEN).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_preview_is_unchanged() {
        assert_eq!(message_preview(MessageType::Text, "hello"), "hello");
    }

    #[test]
    fn test_long_text_preview_is_truncated_to_50() {
        let content = "x".repeat(120);
        let preview = message_preview(MessageType::Text, &content);
        assert_eq!(preview.len(), MESSAGE_PREVIEW_LEN);
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let content = "é".repeat(60);
        let preview = message_preview(MessageType::Text, &content);
        assert_eq!(preview.chars().count(), MESSAGE_PREVIEW_LEN);
    }

    #[test]
    fn test_image_preview_ignores_content() {
        assert_eq!(
            message_preview(MessageType::Image, "https://cdn.example/pic.png"),
            "Sent an image"
        );
    }

    #[test]
    fn test_new_notification_starts_unread() {
        let n = Notification::new(
            UserId::from("emp-1"),
            UserId::from("seeker-1"),
            ApplicationId::from("job-1__seeker-1"),
            "hi".to_string(),
        );
        assert!(!n.is_read);
        assert_eq!(n.recipient, UserId::from("emp-1"));
    }
}
