//! Registration, login and profile handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use jobgrid_models::{Role, UserId, UserProfile};
use jobgrid_store::StoredUser;

use crate::auth::{hash_password, issue_token, verify_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub role: Role,

    // Job seeker fields
    pub phone: Option<String>,
    pub resume: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: String,

    // Employer fields
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_description: String,
    #[serde(default)]
    pub website: String,
}

/// Auth response: session token plus the profile.
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Register a new account.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    if request.role == Role::Admin {
        return Err(ApiError::forbidden("Admin accounts cannot self-register"));
    }

    let now = Utc::now();
    let profile = UserProfile {
        user_id: UserId::new(),
        name: request.name,
        email: request.email,
        role: request.role,
        phone: request.phone,
        resume: request.resume,
        skills: request.skills,
        experience: request.experience,
        company_name: request.company_name,
        company_description: request.company_description,
        website: request.website,
        created_at: now,
        updated_at: now,
    };
    profile
        .validate_role_fields()
        .map_err(ApiError::Validation)?;

    let user = StoredUser {
        password_hash: hash_password(&request.password)?,
        profile,
    };

    state.users.create(&user).await.map_err(|e| match e {
        jobgrid_store::StoreError::AlreadyExists(_) => {
            ApiError::conflict("An account with this email already exists")
        }
        other => other.into(),
    })?;

    let token = issue_token(&state.config, &user.profile.user_id, user.profile.role)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.profile,
        }),
    ))
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Log in with email and password.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    // Same error for unknown email and wrong password
    let user = state
        .users
        .find_by_email(&request.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = issue_token(&state.config, &user.profile.user_id, user.profile.role)?;
    Ok(Json(AuthResponse {
        token,
        user: user.profile,
    }))
}

/// Get the caller's profile.
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let stored = state
        .users
        .get(&user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Account no longer exists"))?;
    Ok(Json(stored.profile))
}

/// Profile update request. All fields optional; role and email are
/// immutable.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub resume: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<String>,
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub website: Option<String>,
}

/// Update the caller's profile.
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ProfileUpdateRequest>,
) -> ApiResult<Json<UserProfile>> {
    let mut stored = state
        .users
        .get(&user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Account no longer exists"))?;

    let profile = &mut stored.profile;
    if let Some(name) = request.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("name cannot be empty".to_string()));
        }
        profile.name = name;
    }
    if let Some(phone) = request.phone {
        profile.phone = Some(phone);
    }
    if let Some(resume) = request.resume {
        profile.resume = Some(resume);
    }
    if let Some(skills) = request.skills {
        profile.skills = skills;
    }
    if let Some(experience) = request.experience {
        profile.experience = experience;
    }
    if let Some(company_name) = request.company_name {
        profile.company_name = Some(company_name);
    }
    if let Some(description) = request.company_description {
        profile.company_description = description;
    }
    if let Some(website) = request.website {
        profile.website = website;
    }
    profile.updated_at = Utc::now();

    profile
        .validate_role_fields()
        .map_err(ApiError::Validation)?;

    state.users.update_profile(profile).await?;
    Ok(Json(stored.profile))
}
