//! Job catalog handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use jobgrid_models::{JobFilter, JobId, JobPosting, JobState, JobType, Role, SalaryRange};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Public job search. Active postings only; filters applied in-process
/// after the store query.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(filter): Query<JobFilter>,
) -> ApiResult<Json<Vec<JobPosting>>> {
    let jobs = state.jobs.list_active().await?;
    Ok(Json(
        jobs.into_iter().filter(|j| filter.matches(j)).collect(),
    ))
}

/// Get a single posting. Public.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> ApiResult<Json<JobPosting>> {
    let job = state
        .jobs
        .get(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Job {} not found", job_id)))?;
    Ok(Json(job))
}

/// Job creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 10_000))]
    pub description: String,
    #[serde(default)]
    pub qualifications: String,
    #[serde(default)]
    pub responsibilities: String,
    pub job_type: JobType,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    pub salary_range: SalaryRange,
}

/// Create a posting. Employers and admins only.
pub async fn create_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateJobRequest>,
) -> ApiResult<(StatusCode, Json<JobPosting>)> {
    user.require_role(&[Role::Employer, Role::Admin])?;
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    if request.salary_range.min > request.salary_range.max {
        return Err(ApiError::Validation(
            "salary range minimum exceeds maximum".to_string(),
        ));
    }

    let now = Utc::now();
    let job = JobPosting {
        job_id: JobId::new(),
        title: request.title,
        description: request.description,
        qualifications: request.qualifications,
        responsibilities: request.responsibilities,
        job_type: request.job_type,
        location: request.location,
        salary_range: request.salary_range,
        employer: user.user_id,
        state: JobState::Active,
        applications_count: 0,
        created_at: now,
        updated_at: now,
    };

    state.jobs.create(&job).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// The caller's own postings. Employers and admins only.
pub async fn my_jobs(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<JobPosting>>> {
    user.require_role(&[Role::Employer, Role::Admin])?;
    Ok(Json(state.jobs.list_by_employer(&user.user_id).await?))
}

/// Partial job update request.
#[derive(Debug, Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub qualifications: Option<String>,
    pub responsibilities: Option<String>,
    pub job_type: Option<JobType>,
    pub location: Option<String>,
    pub salary_range: Option<SalaryRange>,
    pub state: Option<JobState>,
}

/// Update a posting. Owner only (admins may touch any posting).
pub async fn update_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<JobId>,
    Json(request): Json<UpdateJobRequest>,
) -> ApiResult<Json<JobPosting>> {
    user.require_role(&[Role::Employer, Role::Admin])?;

    let mut job = state
        .jobs
        .get(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Job {} not found", job_id)))?;

    if !job.is_owned_by(&user.user_id) && !user.is_admin() {
        return Err(ApiError::forbidden("Not your job posting"));
    }

    if let Some(title) = request.title {
        if title.trim().is_empty() {
            return Err(ApiError::Validation("title cannot be empty".to_string()));
        }
        job.title = title;
    }
    if let Some(description) = request.description {
        job.description = description;
    }
    if let Some(qualifications) = request.qualifications {
        job.qualifications = qualifications;
    }
    if let Some(responsibilities) = request.responsibilities {
        job.responsibilities = responsibilities;
    }
    if let Some(job_type) = request.job_type {
        job.job_type = job_type;
    }
    if let Some(location) = request.location {
        job.location = location;
    }
    if let Some(salary_range) = request.salary_range {
        if salary_range.min > salary_range.max {
            return Err(ApiError::Validation(
                "salary range minimum exceeds maximum".to_string(),
            ));
        }
        job.salary_range = salary_range;
    }
    if let Some(job_state) = request.state {
        job.state = job_state;
    }
    job.updated_at = Utc::now();

    state.jobs.update(&job).await?;
    Ok(Json(job))
}

/// Deletion summary.
#[derive(Serialize)]
pub struct DeleteJobResponse {
    pub deleted_applications: u64,
}

/// Delete a posting and cascade to its applications. Owner only.
pub async fn delete_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<JobId>,
) -> ApiResult<Json<DeleteJobResponse>> {
    user.require_role(&[Role::Employer, Role::Admin])?;

    let job = state
        .jobs
        .get(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Job {} not found", job_id)))?;

    if !job.is_owned_by(&user.user_id) && !user.is_admin() {
        return Err(ApiError::forbidden("Not your job posting"));
    }

    // Applications go first; a crash between the two writes leaves a job
    // with no applications rather than orphaned applications.
    let deleted_applications = state.applications.delete_for_job(&job_id).await?;
    state.jobs.delete(&job_id).await?;

    Ok(Json(DeleteJobResponse {
        deleted_applications,
    }))
}
