//! Job catalog repository.

use std::collections::HashMap;

use tracing::{info, warn};

use jobgrid_models::{JobId, JobPosting, JobState, JobType, SalaryRange, UserId};

use crate::client::StoreClient;
use crate::error::{StoreError, StoreResult};
use crate::types::{
    CollectionSelector, Document, Filter, FromDocValue, MapValue, Order, StructuredQuery,
    ToDocValue, Value,
};

/// Collection holding job postings.
const JOBS: &str = "jobs";

/// Repository for job posting documents.
#[derive(Clone)]
pub struct JobRepository {
    client: StoreClient,
}

impl JobRepository {
    /// Create a new job repository.
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Create a posting.
    pub async fn create(&self, job: &JobPosting) -> StoreResult<()> {
        let fields = job_to_fields(job);
        self.client
            .create_document(JOBS, job.job_id.as_str(), fields)
            .await?;
        info!("Created job {} by employer {}", job.job_id, job.employer);
        Ok(())
    }

    /// Get a posting by id.
    pub async fn get(&self, job_id: &JobId) -> StoreResult<Option<JobPosting>> {
        let doc = self.client.get_document(JOBS, job_id.as_str()).await?;
        match doc {
            Some(d) => Ok(Some(document_to_job(&d)?)),
            None => Ok(None),
        }
    }

    /// Overwrite a posting's mutable fields.
    pub async fn update(&self, job: &JobPosting) -> StoreResult<()> {
        let mut fields = job_to_fields(job);
        // Creation metadata is immutable.
        fields.remove("created_at");
        fields.remove("employer");
        fields.remove("applications_count");

        let mask = fields.keys().cloned().collect();
        self.client
            .patch_document(JOBS, job.job_id.as_str(), fields, mask)
            .await?;
        Ok(())
    }

    /// Delete a posting.
    pub async fn delete(&self, job_id: &JobId) -> StoreResult<()> {
        self.client.delete_document(JOBS, job_id.as_str()).await
    }

    /// List active postings, newest first. Fine-grained filters
    /// (keyword, location, salary) are applied by the caller.
    pub async fn list_active(&self) -> StoreResult<Vec<JobPosting>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: JOBS.to_string(),
                all_descendants: None,
            }],
            r#where: Some(Filter::eq(
                "state",
                Value::StringValue(JobState::Active.as_str().to_string()),
            )),
            order_by: Some(vec![Order::desc("created_at")]),
            limit: None,
        };
        self.collect_jobs(query).await
    }

    /// List an employer's postings, newest first.
    pub async fn list_by_employer(&self, employer: &UserId) -> StoreResult<Vec<JobPosting>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: JOBS.to_string(),
                all_descendants: None,
            }],
            r#where: Some(Filter::eq(
                "employer",
                Value::StringValue(employer.as_str().to_string()),
            )),
            order_by: Some(vec![Order::desc("created_at")]),
            limit: None,
        };
        self.collect_jobs(query).await
    }

    /// The `n` most recent postings across the platform.
    pub async fn recent(&self, n: i32) -> StoreResult<Vec<JobPosting>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: JOBS.to_string(),
                all_descendants: None,
            }],
            r#where: None,
            order_by: Some(vec![Order::desc("created_at")]),
            limit: Some(n),
        };
        self.collect_jobs(query).await
    }

    /// Count all postings.
    pub async fn count_all(&self) -> StoreResult<u64> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: JOBS.to_string(),
                all_descendants: None,
            }],
            r#where: None,
            order_by: None,
            limit: None,
        };
        Ok(self.client.run_query(query).await?.len() as u64)
    }

    /// Increment the denormalized applications counter by 1.
    ///
    /// Read-modify-write; not atomic under concurrent applies. Drift is
    /// tolerated, the counter is advisory display data.
    pub async fn increment_applications_count(&self, job_id: &JobId) -> StoreResult<u32> {
        let doc = self.client.get_document(JOBS, job_id.as_str()).await?;
        let current: u32 = doc
            .as_ref()
            .and_then(|d| d.get("applications_count"))
            .unwrap_or(0);
        let next = current + 1;

        let mut fields = HashMap::new();
        fields.insert("applications_count".to_string(), next.to_doc_value());
        self.client
            .patch_document(
                JOBS,
                job_id.as_str(),
                fields,
                vec!["applications_count".to_string()],
            )
            .await?;
        Ok(next)
    }

    async fn collect_jobs(&self, query: StructuredQuery) -> StoreResult<Vec<JobPosting>> {
        let docs = self.client.run_query(query).await?;
        let mut jobs = Vec::with_capacity(docs.len());
        for doc in docs {
            match document_to_job(&doc) {
                Ok(job) => jobs.push(job),
                Err(e) => warn!("Skipping malformed job document: {}", e),
            }
        }
        Ok(jobs)
    }
}

// =============================================================================
// Field mapping
// =============================================================================

fn job_to_fields(job: &JobPosting) -> HashMap<String, Value> {
    let mut salary = HashMap::new();
    salary.insert("min".to_string(), job.salary_range.min.to_doc_value());
    salary.insert("max".to_string(), job.salary_range.max.to_doc_value());

    let mut fields = HashMap::new();
    fields.insert("title".to_string(), job.title.to_doc_value());
    fields.insert("description".to_string(), job.description.to_doc_value());
    fields.insert(
        "qualifications".to_string(),
        job.qualifications.to_doc_value(),
    );
    fields.insert(
        "responsibilities".to_string(),
        job.responsibilities.to_doc_value(),
    );
    fields.insert("job_type".to_string(), job.job_type.as_str().to_doc_value());
    fields.insert("location".to_string(), job.location.to_doc_value());
    fields.insert(
        "salary_range".to_string(),
        Value::MapValue(MapValue {
            fields: Some(salary),
        }),
    );
    fields.insert("employer".to_string(), job.employer.as_str().to_doc_value());
    fields.insert("state".to_string(), job.state.as_str().to_doc_value());
    fields.insert(
        "applications_count".to_string(),
        job.applications_count.to_doc_value(),
    );
    fields.insert("created_at".to_string(), job.created_at.to_doc_value());
    fields.insert("updated_at".to_string(), job.updated_at.to_doc_value());
    fields
}

fn document_to_job(doc: &Document) -> StoreResult<JobPosting> {
    let job_id = doc
        .doc_id()
        .ok_or_else(|| StoreError::invalid_document("job document without a name"))?;

    let job_type: JobType = doc
        .get::<String>("job_type")
        .ok_or_else(|| StoreError::invalid_document(format!("job {} missing job_type", job_id)))?
        .parse()
        .map_err(|e: String| StoreError::invalid_document(e))?;

    let state: JobState = doc
        .get::<String>("state")
        .unwrap_or_else(|| "active".to_string())
        .parse()
        .map_err(|e: String| StoreError::invalid_document(e))?;

    let salary_range = match doc.field("salary_range") {
        Some(Value::MapValue(MapValue { fields: Some(m) })) => SalaryRange {
            min: m.get("min").and_then(i64::from_doc_value).unwrap_or_default(),
            max: m.get("max").and_then(i64::from_doc_value).unwrap_or_default(),
        },
        _ => {
            return Err(StoreError::invalid_document(format!(
                "job {} missing salary_range",
                job_id
            )))
        }
    };

    Ok(JobPosting {
        job_id: JobId::from(job_id),
        title: doc.get("title").unwrap_or_default(),
        description: doc.get("description").unwrap_or_default(),
        qualifications: doc.get("qualifications").unwrap_or_default(),
        responsibilities: doc.get("responsibilities").unwrap_or_default(),
        job_type,
        location: doc.get("location").unwrap_or_default(),
        salary_range,
        employer: UserId::from(
            doc.get::<String>("employer").ok_or_else(|| {
                StoreError::invalid_document(format!("job {} missing employer", job_id))
            })?,
        ),
        state,
        applications_count: doc.get("applications_count").unwrap_or(0),
        created_at: doc.get("created_at").unwrap_or_else(chrono::Utc::now),
        updated_at: doc.get("updated_at").unwrap_or_else(chrono::Utc::now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn job() -> JobPosting {
        JobPosting {
            job_id: JobId::from("job-1"),
            title: "Backend Engineer".to_string(),
            description: "APIs".to_string(),
            qualifications: "Rust".to_string(),
            responsibilities: "Ship".to_string(),
            job_type: JobType::Hybrid,
            location: "Remote, EU".to_string(),
            salary_range: SalaryRange {
                min: 60_000,
                max: 90_000,
            },
            employer: UserId::from("emp-1"),
            state: JobState::Active,
            applications_count: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_job_field_mapping_round_trip() {
        let fields = job_to_fields(&job());
        let doc = Document {
            name: Some("projects/p/databases/d/documents/jobs/job-1".to_string()),
            fields: Some(fields),
            create_time: None,
            update_time: None,
        };

        let parsed = document_to_job(&doc).unwrap();
        assert_eq!(parsed.job_id, JobId::from("job-1"));
        assert_eq!(parsed.job_type, JobType::Hybrid);
        assert_eq!(parsed.salary_range.min, 60_000);
        assert_eq!(parsed.salary_range.max, 90_000);
        assert_eq!(parsed.applications_count, 3);
    }

    #[test]
    fn test_update_never_touches_immutable_fields() {
        let mut fields = job_to_fields(&job());
        fields.remove("created_at");
        fields.remove("employer");
        fields.remove("applications_count");
        assert!(!fields.contains_key("created_at"));
        assert!(!fields.contains_key("employer"));
        assert!(fields.contains_key("title"));
    }

    #[test]
    fn test_job_without_salary_range_is_invalid() {
        let mut fields = job_to_fields(&job());
        fields.remove("salary_range");
        let doc = Document {
            name: Some("jobs/job-2".to_string()),
            fields: Some(fields),
            create_time: None,
            update_time: None,
        };
        assert!(document_to_job(&doc).is_err());
    }
}
