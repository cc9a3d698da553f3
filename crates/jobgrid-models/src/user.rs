//! User account models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::role::Role;

/// A user account.
///
/// The password hash is deliberately not part of this struct; reads of a
/// profile can never leak it. The store layer carries the hash in a
/// separate field alongside the profile document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UserProfile {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,

    // Job seeker fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: String,

    // Employer fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_description: String,
    #[serde(default)]
    pub website: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Validate that role-specific required fields are present.
    pub fn validate_role_fields(&self) -> Result<(), String> {
        match self.role {
            Role::JobSeeker => {
                if self.phone.as_deref().unwrap_or("").is_empty() {
                    return Err("phone is required for job seekers".to_string());
                }
            }
            Role::Employer => {
                if self.company_name.as_deref().unwrap_or("").is_empty() {
                    return Err("companyName is required for employers".to_string());
                }
            }
            Role::Admin => {}
        }
        Ok(())
    }
}
