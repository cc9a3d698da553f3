//! Application lifecycle engine.
//!
//! Owns the flows that touch an application after it exists: status
//! transitions, the message thread and offer letters. Handlers do the
//! coarse role gating; this service does ownership resolution and
//! delegates legality to the state machine in the models crate.

use chrono::Utc;
use tracing::{info, warn};

use jobgrid_models::{
    message_preview, Actor, Application, ApplicationId, ApplicationStatus, JobId, JobPosting,
    Message, MessageType, Notification, OfferLetter, OfferStatus, UserId,
};
use jobgrid_store::{ApplicationRepository, JobRepository};

use crate::error::{ApiError, ApiResult};

/// Application lifecycle service.
#[derive(Clone)]
pub struct LifecycleService {
    jobs: JobRepository,
    applications: ApplicationRepository,
}

impl LifecycleService {
    pub fn new(jobs: JobRepository, applications: ApplicationRepository) -> Self {
        Self { jobs, applications }
    }

    /// File a new application.
    ///
    /// The deterministic document id turns a duplicate apply into a
    /// store-level conflict, which surfaces as 409. The applications
    /// counter bump afterwards is best-effort; drift is tolerated.
    pub async fn apply(
        &self,
        applicant: &UserId,
        job_id: &JobId,
        cover_letter: Option<String>,
    ) -> ApiResult<Application> {
        let job = self.require_job(job_id).await?;

        let application = Application::new(job.job_id.clone(), applicant.clone(), cover_letter);
        self.applications.create(&application).await.map_err(|e| {
            match e {
                jobgrid_store::StoreError::AlreadyExists(_) => {
                    ApiError::conflict("You have already applied to this job")
                }
                other => other.into(),
            }
        })?;

        if let Err(e) = self.jobs.increment_applications_count(job_id).await {
            warn!("Failed to bump applications count for {}: {}", job_id, e);
        }

        Ok(application)
    }

    /// A seeker's own applications, newest first.
    pub async fn my_applications(&self, applicant: &UserId) -> ApiResult<Vec<Application>> {
        Ok(self.applications.list_by_applicant(applicant).await?)
    }

    /// Applications filed against a job. Restricted to the owning
    /// employer and admins.
    pub async fn applications_for_job(
        &self,
        caller: &UserId,
        caller_is_admin: bool,
        job_id: &JobId,
    ) -> ApiResult<Vec<Application>> {
        let job = self.require_job(job_id).await?;
        if !caller_is_admin && !job.is_owned_by(caller) {
            return Err(ApiError::forbidden("Not your job posting"));
        }
        Ok(self.applications.list_by_job(job_id).await?)
    }

    /// Change an application's status on behalf of `caller`.
    ///
    /// The caller must be the owning employer or the applicant; the
    /// state machine then decides whether that actor may reach the
    /// target. An applicant response to an outstanding offer moves the
    /// offer status in the same write.
    pub async fn update_status(
        &self,
        caller: &UserId,
        application_id: &ApplicationId,
        target: &str,
    ) -> ApiResult<Application> {
        let target = ApplicationStatus::parse(target).ok_or_else(|| {
            ApiError::bad_request(format!(
                "Invalid status '{}'; expected Pending, Accepted or Rejected",
                target
            ))
        })?;

        let (mut application, job) = self.require_application(application_id).await?;
        let actor = self.resolve_actor(caller, &application, &job)?;

        application
            .set_status(actor, target)
            .map_err(|e| ApiError::forbidden(e.to_string()))?;
        self.applications.update_status(&application).await?;

        info!(
            "Application {} set to {} by {:?}",
            application.application_id, target, actor
        );
        Ok(application)
    }

    /// Append a message to an application thread. Returns the stored
    /// message and the notification for the counterparty; the caller is
    /// responsible for dispatching it.
    pub async fn send_message(
        &self,
        caller: &UserId,
        application_id: &ApplicationId,
        content: String,
        message_type: MessageType,
        image_url: Option<String>,
    ) -> ApiResult<(Message, Notification)> {
        let (mut application, job) = self.require_application(application_id).await?;
        if !application.is_participant(caller, &job.employer) {
            return Err(ApiError::forbidden("Not a participant in this application"));
        }

        let message = Message {
            sender: caller.clone(),
            content,
            message_type,
            image_url,
            sent_at: Utc::now(),
        };

        let preview = message_preview(message.message_type, &message.content);
        let recipient = application.counterparty(caller, &job.employer);

        let appended = application.push_message(message).clone();
        self.applications.update_messages(&application).await?;

        let notification = Notification::new(
            recipient,
            caller.clone(),
            application.application_id.clone(),
            preview,
        );
        Ok((appended, notification))
    }

    /// Fetch an application's message thread. Participants only.
    pub async fn messages(
        &self,
        caller: &UserId,
        application_id: &ApplicationId,
    ) -> ApiResult<Vec<Message>> {
        let (application, job) = self.require_application(application_id).await?;
        if !application.is_participant(caller, &job.employer) {
            return Err(ApiError::forbidden("Not a participant in this application"));
        }
        Ok(application.messages)
    }

    /// Issue an offer letter. Owning employer only; forces the
    /// application into Accepted in the same write.
    pub async fn send_offer(
        &self,
        caller: &UserId,
        application_id: &ApplicationId,
        content: String,
        salary: String,
        joining_date: String,
    ) -> ApiResult<Application> {
        let (mut application, job) = self.require_application(application_id).await?;
        if !job.is_owned_by(caller) {
            return Err(ApiError::forbidden("Only the job owner may send an offer"));
        }

        application.record_offer(OfferLetter {
            content,
            salary,
            joining_date,
            sent_at: Utc::now(),
            status: OfferStatus::Sent,
        });
        self.applications.set_offer(&application).await?;

        info!("Offer sent on application {}", application.application_id);
        Ok(application)
    }

    fn resolve_actor(
        &self,
        caller: &UserId,
        application: &Application,
        job: &JobPosting,
    ) -> ApiResult<Actor> {
        if job.is_owned_by(caller) {
            Ok(Actor::Employer)
        } else if &application.applicant == caller {
            Ok(Actor::Applicant)
        } else {
            Err(ApiError::forbidden("Not a participant in this application"))
        }
    }

    async fn require_job(&self, job_id: &JobId) -> ApiResult<JobPosting> {
        self.jobs
            .get(job_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Job {} not found", job_id)))
    }

    async fn require_application(
        &self,
        application_id: &ApplicationId,
    ) -> ApiResult<(Application, JobPosting)> {
        let application = self
            .applications
            .get(application_id)
            .await?
            .ok_or_else(|| {
                ApiError::not_found(format!("Application {} not found", application_id))
            })?;
        let job = self.require_job(&application.job).await?;
        Ok((application, job))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobgrid_models::{JobState, JobType, SalaryRange};

    fn job(owner: &str) -> JobPosting {
        JobPosting {
            job_id: JobId::from("job-1"),
            title: "Backend Engineer".to_string(),
            description: String::new(),
            qualifications: String::new(),
            responsibilities: String::new(),
            job_type: JobType::FullTime,
            location: "Berlin".to_string(),
            salary_range: SalaryRange { min: 0, max: 1 },
            employer: UserId::from(owner),
            state: JobState::Active,
            applications_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service() -> LifecycleService {
        // Actor resolution is pure; the repositories are never touched.
        let config = jobgrid_store::StoreConfig {
            project_id: "test".to_string(),
            database_id: "(default)".to_string(),
            timeout: std::time::Duration::from_secs(1),
            connect_timeout: std::time::Duration::from_secs(1),
            retry: Default::default(),
            emulator_host: Some("localhost:8080".to_string()),
        };
        let client = tokio_test::block_on(jobgrid_store::StoreClient::new(config)).unwrap();
        LifecycleService::new(
            JobRepository::new(client.clone()),
            ApplicationRepository::new(client),
        )
    }

    #[test]
    fn test_actor_resolution() {
        let service = service();
        let job = job("emp-1");
        let app = Application::new(JobId::from("job-1"), UserId::from("seeker-1"), None);

        assert_eq!(
            service
                .resolve_actor(&UserId::from("emp-1"), &app, &job)
                .unwrap(),
            Actor::Employer
        );
        assert_eq!(
            service
                .resolve_actor(&UserId::from("seeker-1"), &app, &job)
                .unwrap(),
            Actor::Applicant
        );
        assert!(service
            .resolve_actor(&UserId::from("stranger"), &app, &job)
            .is_err());
    }
}
