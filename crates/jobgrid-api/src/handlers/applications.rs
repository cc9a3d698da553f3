//! Application lifecycle handlers.
//!
//! Coarse role gates happen here; ownership and transition legality are
//! the lifecycle service's job.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use jobgrid_models::{Application, ApplicationId, JobId, Message, MessageType, Role, UserId};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Apply request.
#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub job_id: JobId,
    pub cover_letter: Option<String>,
}

/// An application enriched with display context for list views.
#[derive(Serialize)]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: Application,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_email: Option<String>,
}

impl ApplicationView {
    fn bare(application: Application) -> Self {
        Self {
            application,
            job_title: None,
            applicant_name: None,
            applicant_email: None,
        }
    }
}

/// File an application. Job seekers only.
pub async fn apply(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ApplyRequest>,
) -> ApiResult<(StatusCode, Json<Application>)> {
    user.require_role(&[Role::JobSeeker])?;

    let application = state
        .lifecycle
        .apply(&user.user_id, &request.job_id, request.cover_letter)
        .await?;

    metrics::record_application_created();
    Ok((StatusCode::CREATED, Json(application)))
}

/// The caller's applications, newest first, with job titles attached.
pub async fn my_applications(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<ApplicationView>>> {
    user.require_role(&[Role::JobSeeker])?;

    let applications = state.lifecycle.my_applications(&user.user_id).await?;

    let mut views = Vec::with_capacity(applications.len());
    for application in applications {
        let job_title = state
            .jobs
            .get(&application.job)
            .await?
            .map(|j| j.title);
        views.push(ApplicationView {
            job_title,
            ..ApplicationView::bare(application)
        });
    }
    Ok(Json(views))
}

/// Applications for a job, with applicant identity attached. Owning
/// employer or admin.
pub async fn job_applicants(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<JobId>,
) -> ApiResult<Json<Vec<ApplicationView>>> {
    user.require_role(&[Role::Employer, Role::Admin])?;

    let applications = state
        .lifecycle
        .applications_for_job(&user.user_id, user.is_admin(), &job_id)
        .await?;

    let mut views = Vec::with_capacity(applications.len());
    for application in applications {
        let applicant = state.users.get(&application.applicant).await?;
        views.push(ApplicationView {
            applicant_name: applicant.as_ref().map(|u| u.profile.name.clone()),
            applicant_email: applicant.map(|u| u.profile.email),
            ..ApplicationView::bare(application)
        });
    }
    Ok(Json(views))
}

/// Status update request.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// Change an application's status. Returns the application with the job
/// title and applicant identity attached for display.
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(application_id): Path<ApplicationId>,
    Json(request): Json<StatusUpdateRequest>,
) -> ApiResult<Json<ApplicationView>> {
    let application = state
        .lifecycle
        .update_status(&user.user_id, &application_id, &request.status)
        .await?;

    metrics::record_status_change(application.status.as_str());

    let job_title = state.jobs.get(&application.job).await?.map(|j| j.title);
    let applicant = state.users.get(&application.applicant).await?;
    Ok(Json(ApplicationView {
        job_title,
        applicant_name: applicant.as_ref().map(|u| u.profile.name.clone()),
        applicant_email: applicant.map(|u| u.profile.email),
        ..ApplicationView::bare(application)
    }))
}

/// Message send request.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
    pub image_url: Option<String>,
}

/// Send a message on an application thread. Participants only. Returns
/// the newly appended message; the counterparty gets one notification,
/// delivered fire-and-forget.
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Path(application_id): Path<ApplicationId>,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    match request.message_type {
        MessageType::Text => {
            if request.content.trim().is_empty() {
                return Err(ApiError::bad_request("Message content cannot be empty"));
            }
        }
        MessageType::Image => {
            if request.image_url.as_deref().unwrap_or("").is_empty() {
                return Err(ApiError::bad_request("Image messages require an image URL"));
            }
        }
    }

    let (message, notification) = state
        .lifecycle
        .send_message(
            &user.user_id,
            &application_id,
            request.content,
            request.message_type,
            request.image_url,
        )
        .await?;

    state.notifier.dispatch(notification);
    metrics::record_message_sent(request.message_type.as_str());
    Ok((StatusCode::CREATED, Json(message)))
}

/// A message with sender display fields attached.
#[derive(Serialize)]
pub struct MessageView {
    #[serde(flatten)]
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_role: Option<Role>,
}

/// Fetch an application's message thread, with sender name and role
/// attached. Participants only.
pub async fn get_messages(
    State(state): State<AppState>,
    user: AuthUser,
    Path(application_id): Path<ApplicationId>,
) -> ApiResult<Json<Vec<MessageView>>> {
    let messages = state
        .lifecycle
        .messages(&user.user_id, &application_id)
        .await?;

    // A thread has at most two distinct senders; look each up once.
    let mut senders: HashMap<UserId, (String, Role)> = HashMap::new();
    for message in &messages {
        if !senders.contains_key(&message.sender) {
            if let Some(stored) = state.users.get(&message.sender).await? {
                senders.insert(
                    message.sender.clone(),
                    (stored.profile.name, stored.profile.role),
                );
            }
        }
    }

    let views = messages
        .into_iter()
        .map(|message| {
            let sender = senders.get(&message.sender);
            MessageView {
                sender_name: sender.map(|(name, _)| name.clone()),
                sender_role: sender.map(|(_, role)| *role),
                message,
            }
        })
        .collect();
    Ok(Json(views))
}

/// Offer letter request.
#[derive(Debug, Deserialize)]
pub struct SendOfferRequest {
    pub content: String,
    pub salary: String,
    pub joining_date: String,
}

/// Send an offer letter. Owning employer only; the application moves to
/// Accepted in the same write.
pub async fn send_offer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(application_id): Path<ApplicationId>,
    Json(request): Json<SendOfferRequest>,
) -> ApiResult<(StatusCode, Json<Application>)> {
    user.require_role(&[Role::Employer])?;

    if request.content.trim().is_empty() {
        return Err(ApiError::bad_request("Offer content cannot be empty"));
    }

    let application = state
        .lifecycle
        .send_offer(
            &user.user_id,
            &application_id,
            request.content,
            request.salary,
            request.joining_date,
        )
        .await?;

    metrics::record_offer_sent();
    Ok((StatusCode::CREATED, Json(application)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_application_view_carries_display_fields() {
        let app = Application::new(JobId::from("job-1"), UserId::from("seeker-1"), None);
        let view = ApplicationView {
            job_title: Some("Backend Engineer".to_string()),
            applicant_name: Some("Alice".to_string()),
            applicant_email: Some("alice@example.com".to_string()),
            ..ApplicationView::bare(app)
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["job_title"], "Backend Engineer");
        assert_eq!(json["applicant_name"], "Alice");
        assert_eq!(json["applicant_email"], "alice@example.com");
        assert_eq!(json["status"], "Pending");
    }

    #[test]
    fn test_message_view_carries_sender_display_fields() {
        let view = MessageView {
            message: Message {
                sender: UserId::from("seeker-1"),
                content: "hello".to_string(),
                message_type: MessageType::Text,
                image_url: None,
                sent_at: Utc::now(),
            },
            sender_name: Some("Alice".to_string()),
            sender_role: Some(Role::JobSeeker),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["content"], "hello");
        assert_eq!(json["sender"], "seeker-1");
        assert_eq!(json["sender_name"], "Alice");
        assert_eq!(json["sender_role"], "jobseeker");
    }
}
