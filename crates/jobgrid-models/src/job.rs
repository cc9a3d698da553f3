//! Job posting models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::{JobId, UserId};

/// Employment type of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum JobType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    #[serde(rename = "Internship")]
    Internship,
    #[serde(rename = "Remote")]
    Remote,
    // Lowercase on the wire for historical compatibility.
    #[serde(rename = "hybrid")]
    Hybrid,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Internship => "Internship",
            JobType::Remote => "Remote",
            JobType::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Full-time" => Ok(JobType::FullTime),
            "Part-time" => Ok(JobType::PartTime),
            "Internship" => Ok(JobType::Internship),
            "Remote" => Ok(JobType::Remote),
            "hybrid" => Ok(JobType::Hybrid),
            other => Err(format!("unknown job type: {}", other)),
        }
    }
}

/// Visibility state of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    #[default]
    Active,
    Inactive,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Active => "active",
            JobState::Inactive => "inactive",
        }
    }
}

impl FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(JobState::Active),
            "inactive" => Ok(JobState::Inactive),
            other => Err(format!("unknown job state: {}", other)),
        }
    }
}

/// Advertised salary range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SalaryRange {
    pub min: i64,
    pub max: i64,
}

/// A job posting stored in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobPosting {
    pub job_id: JobId,
    pub title: String,
    pub description: String,
    pub qualifications: String,
    pub responsibilities: String,
    pub job_type: JobType,
    pub location: String,
    pub salary_range: SalaryRange,
    /// Employer account that owns the posting.
    pub employer: UserId,
    #[serde(default)]
    pub state: JobState,
    /// Denormalized count of applications, incremented best-effort.
    #[serde(default)]
    pub applications_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobPosting {
    /// Whether the given user owns this posting.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.employer == user_id
    }
}

/// Search filters for the public job listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
}

impl JobFilter {
    /// Whether a posting matches every provided filter.
    ///
    /// Keyword and location are case-insensitive substring matches;
    /// keyword searches the title, description and location.
    pub fn matches(&self, job: &JobPosting) -> bool {
        if let Some(keyword) = &self.keyword {
            let kw = keyword.to_lowercase();
            let hit = job.title.to_lowercase().contains(&kw)
                || job.description.to_lowercase().contains(&kw)
                || job.location.to_lowercase().contains(&kw);
            if !hit {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !job
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
            {
                return false;
            }
        }
        if let Some(job_type) = self.job_type {
            if job.job_type != job_type {
                return false;
            }
        }
        if let Some(min) = self.min_salary {
            if job.salary_range.min < min {
                return false;
            }
        }
        if let Some(max) = self.max_salary {
            if job.salary_range.max > max {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job() -> JobPosting {
        JobPosting {
            job_id: JobId::from("job-1"),
            title: "Senior Rust Engineer".to_string(),
            description: "Build backend services".to_string(),
            qualifications: "5 years experience".to_string(),
            responsibilities: "Own the API layer".to_string(),
            job_type: JobType::FullTime,
            location: "Berlin, Germany".to_string(),
            salary_range: SalaryRange {
                min: 70_000,
                max: 95_000,
            },
            employer: UserId::from("emp-1"),
            state: JobState::Active,
            applications_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_job_type_wire_strings() {
        assert_eq!(
            serde_json::to_string(&JobType::FullTime).unwrap(),
            "\"Full-time\""
        );
        // Lowercase "hybrid" preserved from the legacy schema.
        assert_eq!(serde_json::to_string(&JobType::Hybrid).unwrap(), "\"hybrid\"");
        assert_eq!("hybrid".parse::<JobType>().unwrap(), JobType::Hybrid);
        assert!("full-time".parse::<JobType>().is_err());
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(JobFilter::default().matches(&sample_job()));
    }

    #[test]
    fn test_keyword_filter_is_case_insensitive() {
        let filter = JobFilter {
            keyword: Some("RUST".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&sample_job()));

        let miss = JobFilter {
            keyword: Some("haskell".to_string()),
            ..Default::default()
        };
        assert!(!miss.matches(&sample_job()));
    }

    #[test]
    fn test_location_filter_matches_substring() {
        let filter = JobFilter {
            location: Some("berlin".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&sample_job()));
    }

    #[test]
    fn test_salary_filter_bounds() {
        let inside = JobFilter {
            min_salary: Some(60_000),
            max_salary: Some(100_000),
            ..Default::default()
        };
        assert!(inside.matches(&sample_job()));

        let too_high_floor = JobFilter {
            min_salary: Some(80_000),
            ..Default::default()
        };
        assert!(!too_high_floor.matches(&sample_job()));

        let too_low_ceiling = JobFilter {
            max_salary: Some(90_000),
            ..Default::default()
        };
        assert!(!too_low_ceiling.matches(&sample_job()));
    }

    #[test]
    fn test_job_type_filter() {
        let filter = JobFilter {
            job_type: Some(JobType::Remote),
            ..Default::default()
        };
        assert!(!filter.matches(&sample_job()));
    }
}
