//! Notification repository.

use std::collections::HashMap;

use tracing::warn;

use jobgrid_models::{ApplicationId, Notification, NotificationId, UserId};

use crate::client::StoreClient;
use crate::error::{StoreError, StoreResult};
use crate::types::{
    CollectionSelector, Document, Filter, Order, StructuredQuery, ToDocValue, Value,
};

/// Collection holding notifications.
const NOTIFICATIONS: &str = "notifications";

/// Repository for notification documents.
#[derive(Clone)]
pub struct NotificationRepository {
    client: StoreClient,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Create a notification.
    pub async fn create(&self, notification: &Notification) -> StoreResult<()> {
        let fields = notification_to_fields(notification);
        self.client
            .create_document(
                NOTIFICATIONS,
                notification.notification_id.as_str(),
                fields,
            )
            .await?;
        Ok(())
    }

    /// Get a notification by id.
    pub async fn get(&self, id: &NotificationId) -> StoreResult<Option<Notification>> {
        let doc = self.client.get_document(NOTIFICATIONS, id.as_str()).await?;
        match doc {
            Some(d) => Ok(Some(document_to_notification(&d)?)),
            None => Ok(None),
        }
    }

    /// A user's notifications, newest first.
    pub async fn list_by_recipient(&self, recipient: &UserId) -> StoreResult<Vec<Notification>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: NOTIFICATIONS.to_string(),
                all_descendants: None,
            }],
            r#where: Some(Filter::eq(
                "recipient",
                Value::StringValue(recipient.as_str().to_string()),
            )),
            order_by: Some(vec![Order::desc("created_at")]),
            limit: None,
        };

        let docs = self.client.run_query(query).await?;
        let mut notifications = Vec::with_capacity(docs.len());
        for doc in docs {
            match document_to_notification(&doc) {
                Ok(n) => notifications.push(n),
                Err(e) => warn!("Skipping malformed notification document: {}", e),
            }
        }
        Ok(notifications)
    }

    /// Mark one notification as read.
    pub async fn mark_read(&self, id: &NotificationId) -> StoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert("is_read".to_string(), true.to_doc_value());
        self.client
            .patch_document(
                NOTIFICATIONS,
                id.as_str(),
                fields,
                vec!["is_read".to_string()],
            )
            .await?;
        Ok(())
    }

    /// Mark all of a user's notifications as read. Returns how many were
    /// flipped.
    pub async fn mark_all_read(&self, recipient: &UserId) -> StoreResult<u64> {
        let notifications = self.list_by_recipient(recipient).await?;
        let mut updated = 0u64;
        for n in notifications.iter().filter(|n| !n.is_read) {
            self.mark_read(&n.notification_id).await?;
            updated += 1;
        }
        Ok(updated)
    }
}

// =============================================================================
// Field mapping
// =============================================================================

fn notification_to_fields(n: &Notification) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("recipient".to_string(), n.recipient.as_str().to_doc_value());
    fields.insert("sender".to_string(), n.sender.as_str().to_doc_value());
    fields.insert(
        "application".to_string(),
        n.application.as_str().to_doc_value(),
    );
    fields.insert("message".to_string(), n.message.to_doc_value());
    fields.insert("is_read".to_string(), n.is_read.to_doc_value());
    fields.insert("created_at".to_string(), n.created_at.to_doc_value());
    fields
}

fn document_to_notification(doc: &Document) -> StoreResult<Notification> {
    let id = doc
        .doc_id()
        .ok_or_else(|| StoreError::invalid_document("notification document without a name"))?;

    Ok(Notification {
        notification_id: NotificationId::from(id),
        recipient: UserId::from(doc.get::<String>("recipient").ok_or_else(|| {
            StoreError::invalid_document(format!("notification {} missing recipient", id))
        })?),
        sender: UserId::from(doc.get::<String>("sender").unwrap_or_default()),
        application: ApplicationId::from(doc.get::<String>("application").unwrap_or_default()),
        message: doc.get("message").unwrap_or_default(),
        is_read: doc.get("is_read").unwrap_or(false),
        created_at: doc.get("created_at").unwrap_or_else(chrono::Utc::now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> Notification {
        Notification::new(
            UserId::from("emp-1"),
            UserId::from("seeker-1"),
            ApplicationId::from("job-1__seeker-1"),
            "New message on your application".to_string(),
        )
    }

    #[test]
    fn test_notification_field_mapping_round_trip() {
        let n = notification();
        let doc = Document {
            name: Some(format!(
                "projects/p/databases/d/documents/notifications/{}",
                n.notification_id
            )),
            fields: Some(notification_to_fields(&n)),
            create_time: None,
            update_time: None,
        };

        let parsed = document_to_notification(&doc).unwrap();
        assert_eq!(parsed.notification_id, n.notification_id);
        assert_eq!(parsed.recipient, UserId::from("emp-1"));
        assert_eq!(parsed.application, ApplicationId::from("job-1__seeker-1"));
        assert!(!parsed.is_read);
    }

    #[test]
    fn test_notification_without_recipient_is_invalid() {
        let doc = Document {
            name: Some("notifications/n-1".to_string()),
            fields: Some(HashMap::new()),
            create_time: None,
            update_time: None,
        };
        assert!(document_to_notification(&doc).is_err());
    }
}
