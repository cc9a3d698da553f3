//! Admin handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use jobgrid_models::{JobPosting, Role, UserId, UserProfile};
use jobgrid_store::StoredUser;

use crate::auth::{hash_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// List every user. Admin only; password hashes never leave the store
/// layer.
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<UserProfile>>> {
    user.require_role(&[Role::Admin])?;
    Ok(Json(state.users.list_all().await?))
}

/// Platform statistics.
#[derive(Serialize)]
pub struct StatsResponse {
    pub total_users: u64,
    pub total_companies: u64,
    pub total_jobs: u64,
    pub total_applications: u64,
    pub accepted_applications: u64,
    /// Listing fees plus placement fees.
    pub revenue: u64,
    pub recent_jobs: Vec<JobPosting>,
}

/// Per-job listing fee used for the revenue estimate.
const LISTING_FEE: u64 = 100;

/// Per-placement fee used for the revenue estimate.
const PLACEMENT_FEE: u64 = 50;

/// Platform stats. Admin only.
pub async fn get_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<StatsResponse>> {
    user.require_role(&[Role::Admin])?;

    let total_users = state.users.count_all().await?;
    let total_companies = state.users.count_by_role(Role::Employer).await?;
    let total_jobs = state.jobs.count_all().await?;
    let total_applications = state.applications.count_all().await?;
    let accepted_applications = state.applications.count_accepted().await?;
    let recent_jobs = state.jobs.recent(5).await?;

    Ok(Json(StatsResponse {
        total_users,
        total_companies,
        total_jobs,
        total_applications,
        accepted_applications,
        revenue: total_jobs * LISTING_FEE + accepted_applications * PLACEMENT_FEE,
        recent_jobs,
    }))
}

/// Request to create a job seeker account on someone's behalf.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobSeekerRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1))]
    pub phone: String,
    pub resume: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: String,
}

/// Create a job seeker account. Admin only.
pub async fn create_jobseeker(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateJobSeekerRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    user.require_role(&[Role::Admin])?;
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let now = Utc::now();
    let profile = UserProfile {
        user_id: UserId::new(),
        name: request.name,
        email: request.email,
        role: Role::JobSeeker,
        phone: Some(request.phone),
        resume: request.resume,
        skills: request.skills,
        experience: request.experience,
        company_name: None,
        company_description: String::new(),
        website: String::new(),
        created_at: now,
        updated_at: now,
    };

    let stored = StoredUser {
        password_hash: hash_password(&request.password)?,
        profile,
    };

    state.users.create(&stored).await.map_err(|e| match e {
        jobgrid_store::StoreError::AlreadyExists(_) => {
            ApiError::conflict("An account with this email already exists")
        }
        other => other.into(),
    })?;

    Ok((StatusCode::CREATED, Json(stored.profile)))
}
