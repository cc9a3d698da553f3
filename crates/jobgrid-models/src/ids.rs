//! Identifier newtypes for stored entities.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Get the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Unique identifier for a user account.
    UserId
);

string_id!(
    /// Unique identifier for a job posting.
    JobId
);

string_id!(
    /// Unique identifier for a notification.
    NotificationId
);

/// Unique identifier for an application.
///
/// Derived from the (job, applicant) pair so the store's create-conflict
/// semantics enforce the one-application-per-pair invariant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    /// Separator between the job and applicant components.
    const SEPARATOR: &'static str = "__";

    /// Derive the identifier for a (job, applicant) pair.
    pub fn for_pair(job_id: &JobId, applicant_id: &UserId) -> Self {
        Self(format!(
            "{}{}{}",
            job_id.as_str(),
            Self::SEPARATOR,
            applicant_id.as_str()
        ))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ApplicationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ApplicationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(UserId::new(), UserId::new());
        assert_ne!(JobId::new(), JobId::new());
    }

    #[test]
    fn test_application_id_is_deterministic_for_pair() {
        let job = JobId::from("job-1");
        let applicant = UserId::from("user-9");
        let a = ApplicationId::for_pair(&job, &applicant);
        let b = ApplicationId::for_pair(&job, &applicant);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "job-1__user-9");
    }

    #[test]
    fn test_application_id_differs_per_applicant() {
        let job = JobId::from("job-1");
        let a = ApplicationId::for_pair(&job, &UserId::from("alice"));
        let b = ApplicationId::for_pair(&job, &UserId::from("bob"));
        assert_ne!(a, b);
    }
}
