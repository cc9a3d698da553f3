//! Application repository.
//!
//! Document ids are deterministic (`{job_id}__{applicant_id}`), so the
//! one-application-per-job-per-seeker rule is enforced by the store
//! itself: a second apply collides on create and surfaces as
//! [`StoreError::AlreadyExists`].

use std::collections::HashMap;

use tracing::{info, warn};

use jobgrid_models::{
    Application, ApplicationId, ApplicationStatus, JobId, Message, MessageType, OfferLetter,
    OfferStatus, UserId,
};

use crate::client::StoreClient;
use crate::error::{StoreError, StoreResult};
use crate::types::{
    ArrayValue, CollectionSelector, Document, Filter, MapValue, Order, StructuredQuery,
    ToDocValue, Value,
};

/// Collection holding applications.
const APPLICATIONS: &str = "applications";

/// Repository for application documents.
#[derive(Clone)]
pub struct ApplicationRepository {
    client: StoreClient,
}

impl ApplicationRepository {
    /// Create a new application repository.
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Create an application. Fails with [`StoreError::AlreadyExists`]
    /// when the seeker has already applied to this job.
    pub async fn create(&self, app: &Application) -> StoreResult<()> {
        let fields = application_to_fields(app);
        self.client
            .create_document(APPLICATIONS, app.application_id.as_str(), fields)
            .await?;
        info!(
            "Created application {} for job {}",
            app.application_id, app.job
        );
        Ok(())
    }

    /// Get an application by id.
    pub async fn get(&self, id: &ApplicationId) -> StoreResult<Option<Application>> {
        let doc = self.client.get_document(APPLICATIONS, id.as_str()).await?;
        match doc {
            Some(d) => Ok(Some(document_to_application(&d)?)),
            None => Ok(None),
        }
    }

    /// A seeker's applications, newest first.
    pub async fn list_by_applicant(&self, applicant: &UserId) -> StoreResult<Vec<Application>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: APPLICATIONS.to_string(),
                all_descendants: None,
            }],
            r#where: Some(Filter::eq(
                "applicant",
                Value::StringValue(applicant.as_str().to_string()),
            )),
            order_by: Some(vec![Order::desc("applied_at")]),
            limit: None,
        };
        self.collect_applications(query).await
    }

    /// All applications filed against a job, newest first.
    pub async fn list_by_job(&self, job: &JobId) -> StoreResult<Vec<Application>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: APPLICATIONS.to_string(),
                all_descendants: None,
            }],
            r#where: Some(Filter::eq(
                "job",
                Value::StringValue(job.as_str().to_string()),
            )),
            order_by: Some(vec![Order::desc("applied_at")]),
            limit: None,
        };
        self.collect_applications(query).await
    }

    /// Persist a status change. When the application carries an offer
    /// letter, its status travels in the same write so the pair cannot
    /// drift apart.
    pub async fn update_status(&self, app: &Application) -> StoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert("status".to_string(), app.status.as_str().to_doc_value());
        if let Some(offer) = &app.offer_letter {
            fields.insert("offer_letter".to_string(), offer_to_value(offer));
        }

        let mask = fields.keys().cloned().collect();
        self.client
            .patch_document(APPLICATIONS, app.application_id.as_str(), fields, mask)
            .await?;
        Ok(())
    }

    /// Persist the message thread.
    ///
    /// The whole array is written under an update mask; appends from two
    /// racing writers resolve last-write-wins, which is accepted for
    /// this chat surface.
    pub async fn update_messages(&self, app: &Application) -> StoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert(
            "messages".to_string(),
            messages_to_value(&app.messages),
        );
        self.client
            .patch_document(
                APPLICATIONS,
                app.application_id.as_str(),
                fields,
                vec!["messages".to_string()],
            )
            .await?;
        Ok(())
    }

    /// Persist an issued offer letter. Offer and the forced Accepted
    /// status land in one write.
    pub async fn set_offer(&self, app: &Application) -> StoreResult<()> {
        let offer = app
            .offer_letter
            .as_ref()
            .ok_or_else(|| StoreError::invalid_document("set_offer without an offer letter"))?;

        let mut fields = HashMap::new();
        fields.insert("offer_letter".to_string(), offer_to_value(offer));
        fields.insert("status".to_string(), app.status.as_str().to_doc_value());

        self.client
            .patch_document(
                APPLICATIONS,
                app.application_id.as_str(),
                fields,
                vec!["offer_letter".to_string(), "status".to_string()],
            )
            .await?;
        Ok(())
    }

    /// Count all applications.
    pub async fn count_all(&self) -> StoreResult<u64> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: APPLICATIONS.to_string(),
                all_descendants: None,
            }],
            r#where: None,
            order_by: None,
            limit: None,
        };
        Ok(self.client.run_query(query).await?.len() as u64)
    }

    /// Count accepted applications (placements).
    pub async fn count_accepted(&self) -> StoreResult<u64> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: APPLICATIONS.to_string(),
                all_descendants: None,
            }],
            r#where: Some(Filter::eq(
                "status",
                Value::StringValue(ApplicationStatus::Accepted.as_str().to_string()),
            )),
            order_by: None,
            limit: None,
        };
        Ok(self.client.run_query(query).await?.len() as u64)
    }

    /// Delete every application filed against a job. Used when the job
    /// itself is deleted.
    pub async fn delete_for_job(&self, job: &JobId) -> StoreResult<u64> {
        let apps = self.list_by_job(job).await?;
        let mut deleted = 0u64;
        for app in &apps {
            self.client
                .delete_document(APPLICATIONS, app.application_id.as_str())
                .await?;
            deleted += 1;
        }
        if deleted > 0 {
            info!("Deleted {} applications for job {}", deleted, job);
        }
        Ok(deleted)
    }

    async fn collect_applications(
        &self,
        query: StructuredQuery,
    ) -> StoreResult<Vec<Application>> {
        let docs = self.client.run_query(query).await?;
        let mut apps = Vec::with_capacity(docs.len());
        for doc in docs {
            match document_to_application(&doc) {
                Ok(app) => apps.push(app),
                Err(e) => warn!("Skipping malformed application document: {}", e),
            }
        }
        Ok(apps)
    }
}

// =============================================================================
// Field mapping
// =============================================================================

fn message_to_value(message: &Message) -> Value {
    let mut fields = HashMap::new();
    fields.insert("sender".to_string(), message.sender.as_str().to_doc_value());
    fields.insert("content".to_string(), message.content.to_doc_value());
    fields.insert(
        "message_type".to_string(),
        message.message_type.as_str().to_doc_value(),
    );
    if let Some(url) = &message.image_url {
        fields.insert("image_url".to_string(), url.to_doc_value());
    }
    fields.insert("sent_at".to_string(), message.sent_at.to_doc_value());
    Value::MapValue(MapValue {
        fields: Some(fields),
    })
}

fn messages_to_value(messages: &[Message]) -> Value {
    Value::ArrayValue(ArrayValue {
        values: Some(messages.iter().map(message_to_value).collect()),
    })
}

fn offer_to_value(offer: &OfferLetter) -> Value {
    let mut fields = HashMap::new();
    fields.insert("content".to_string(), offer.content.to_doc_value());
    fields.insert("salary".to_string(), offer.salary.to_doc_value());
    fields.insert(
        "joining_date".to_string(),
        offer.joining_date.to_doc_value(),
    );
    fields.insert("sent_at".to_string(), offer.sent_at.to_doc_value());
    fields.insert("status".to_string(), offer.status.as_str().to_doc_value());
    Value::MapValue(MapValue {
        fields: Some(fields),
    })
}

fn application_to_fields(app: &Application) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("job".to_string(), app.job.as_str().to_doc_value());
    fields.insert(
        "applicant".to_string(),
        app.applicant.as_str().to_doc_value(),
    );
    fields.insert("status".to_string(), app.status.as_str().to_doc_value());
    fields.insert(
        "cover_letter".to_string(),
        app.cover_letter.to_doc_value(),
    );
    fields.insert("applied_at".to_string(), app.applied_at.to_doc_value());
    fields.insert("messages".to_string(), messages_to_value(&app.messages));
    if let Some(offer) = &app.offer_letter {
        fields.insert("offer_letter".to_string(), offer_to_value(offer));
    }
    fields
}

fn value_to_message(value: &Value) -> Option<Message> {
    let Value::MapValue(MapValue { fields: Some(m) }) = value else {
        return None;
    };
    let get_str = |name: &str| -> Option<String> {
        m.get(name).and_then(|v| match v {
            Value::StringValue(s) => Some(s.clone()),
            _ => None,
        })
    };

    let message_type = get_str("message_type")
        .and_then(|s| MessageType::parse(&s))
        .unwrap_or_default();

    Some(Message {
        sender: UserId::from(get_str("sender")?),
        content: get_str("content").unwrap_or_default(),
        message_type,
        image_url: get_str("image_url"),
        sent_at: m
            .get("sent_at")
            .and_then(crate::types::FromDocValue::from_doc_value)
            .unwrap_or_else(chrono::Utc::now),
    })
}

fn value_to_offer(value: &Value) -> Option<OfferLetter> {
    let Value::MapValue(MapValue { fields: Some(m) }) = value else {
        return None;
    };
    let get_str = |name: &str| -> Option<String> {
        m.get(name).and_then(|v| match v {
            Value::StringValue(s) => Some(s.clone()),
            _ => None,
        })
    };

    Some(OfferLetter {
        content: get_str("content").unwrap_or_default(),
        salary: get_str("salary").unwrap_or_default(),
        joining_date: get_str("joining_date").unwrap_or_default(),
        sent_at: m
            .get("sent_at")
            .and_then(crate::types::FromDocValue::from_doc_value)
            .unwrap_or_else(chrono::Utc::now),
        status: get_str("status")
            .and_then(|s| OfferStatus::parse(&s))
            .unwrap_or_default(),
    })
}

fn document_to_application(doc: &Document) -> StoreResult<Application> {
    let id = doc
        .doc_id()
        .ok_or_else(|| StoreError::invalid_document("application document without a name"))?;

    let status: ApplicationStatus = doc
        .get::<String>("status")
        .and_then(|s| ApplicationStatus::parse(&s))
        .ok_or_else(|| {
            StoreError::invalid_document(format!("application {} has no valid status", id))
        })?;

    let messages = match doc.field("messages") {
        Some(Value::ArrayValue(arr)) => arr
            .values
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(value_to_message)
            .collect(),
        _ => Vec::new(),
    };

    let offer_letter = doc.field("offer_letter").and_then(value_to_offer);

    Ok(Application {
        application_id: ApplicationId::from(id),
        job: JobId::from(doc.get::<String>("job").ok_or_else(|| {
            StoreError::invalid_document(format!("application {} missing job", id))
        })?),
        applicant: UserId::from(doc.get::<String>("applicant").ok_or_else(|| {
            StoreError::invalid_document(format!("application {} missing applicant", id))
        })?),
        status,
        cover_letter: doc.get("cover_letter").unwrap_or_default(),
        applied_at: doc.get("applied_at").unwrap_or_else(chrono::Utc::now),
        messages,
        offer_letter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn application() -> Application {
        let mut app = Application::new(JobId::from("job-1"), UserId::from("seeker-1"), Some("Hi".to_string()));
        app.push_message(Message {
            sender: UserId::from("seeker-1"),
            content: "Looking forward to hearing from you".to_string(),
            message_type: MessageType::Text,
            image_url: None,
            sent_at: Utc::now(),
        });
        app.push_message(Message {
            sender: UserId::from("emp-1"),
            content: String::new(),
            message_type: MessageType::Image,
            image_url: Some("https://cdn.example/pic.png".to_string()),
            sent_at: Utc::now(),
        });
        app
    }

    fn doc_for(app: &Application) -> Document {
        Document {
            name: Some(format!(
                "projects/p/databases/d/documents/applications/{}",
                app.application_id
            )),
            fields: Some(application_to_fields(app)),
            create_time: None,
            update_time: None,
        }
    }

    #[test]
    fn test_application_field_mapping_round_trip() {
        let app = application();
        let parsed = document_to_application(&doc_for(&app)).unwrap();

        assert_eq!(parsed.application_id, app.application_id);
        assert_eq!(parsed.job, JobId::from("job-1"));
        assert_eq!(parsed.applicant, UserId::from("seeker-1"));
        assert_eq!(parsed.status, ApplicationStatus::Pending);
        assert_eq!(parsed.cover_letter, "Hi");
        assert_eq!(parsed.messages.len(), 2);
        assert_eq!(parsed.messages[1].message_type, MessageType::Image);
        assert_eq!(
            parsed.messages[1].image_url.as_deref(),
            Some("https://cdn.example/pic.png")
        );
        assert!(parsed.offer_letter.is_none());
    }

    #[test]
    fn test_offer_letter_round_trip() {
        let mut app = application();
        app.record_offer(OfferLetter {
            content: "Offer".to_string(),
            salary: "75000".to_string(),
            joining_date: "2025-03-01".to_string(),
            sent_at: Utc::now(),
            status: OfferStatus::Sent,
        });

        let parsed = document_to_application(&doc_for(&app)).unwrap();
        assert_eq!(parsed.status, ApplicationStatus::Accepted);
        let offer = parsed.offer_letter.unwrap();
        assert_eq!(offer.salary, "75000");
        assert_eq!(offer.status, OfferStatus::Sent);
    }

    #[test]
    fn test_document_with_bad_status_is_invalid() {
        let app = application();
        let mut doc = doc_for(&app);
        if let Some(fields) = doc.fields.as_mut() {
            fields.insert(
                "status".to_string(),
                Value::StringValue("withdrawn".to_string()),
            );
        }
        assert!(document_to_application(&doc).is_err());
    }

    #[test]
    fn test_malformed_message_entries_are_skipped() {
        let app = application();
        let mut doc = doc_for(&app);
        if let Some(fields) = doc.fields.as_mut() {
            fields.insert(
                "messages".to_string(),
                Value::ArrayValue(ArrayValue {
                    values: Some(vec![
                        Value::StringValue("not a message".to_string()),
                        message_to_value(&app.messages[0]),
                    ]),
                }),
            );
        }
        let parsed = document_to_application(&doc).unwrap();
        assert_eq!(parsed.messages.len(), 1);
    }
}
