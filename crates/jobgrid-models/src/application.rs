//! Application aggregate: status state machine, message thread, offer letter.
//!
//! An application is one job seeker's candidacy for one job posting. Its
//! status moves through a small role-gated state machine; the message
//! thread is append-only; the offer letter is an embedded sub-document
//! whose issuance is coupled to acceptance.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{ApplicationId, JobId, UserId};

/// Application status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Parse a requested status value. Anything outside the three legal
    /// values is invalid input, not an unknown variant.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(ApplicationStatus::Pending),
            "Accepted" => Some(ApplicationStatus::Accepted),
            "Rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who is requesting a status transition, relative to the application.
///
/// Callers that are neither the owning employer nor the applicant never
/// reach the state machine; the lifecycle engine refuses them first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// The employer that owns the job this application targets.
    Employer,
    /// The job seeker who filed the application.
    Applicant,
}

/// A transition the state machine refuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("applicants may not reset an application to Pending")]
    ApplicantCannotReset,
}

impl ApplicationStatus {
    /// Check a requested transition against the role-gated state machine.
    ///
    /// The employer-owner may set any of the three states, including
    /// re-opening a terminal one. The applicant may only move between
    /// Accepted and Rejected (responding to an offer) and never back to
    /// Pending. The target set for applicants is a strict subset of the
    /// employer's.
    pub fn transition(self, actor: Actor, target: ApplicationStatus) -> Result<ApplicationStatus, TransitionError> {
        match (actor, target) {
            (Actor::Employer, _) => Ok(target),
            (Actor::Applicant, ApplicationStatus::Pending) => {
                Err(TransitionError::ApplicantCannotReset)
            }
            (Actor::Applicant, _) => Ok(target),
        }
    }
}

/// Kind of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(MessageType::Text),
            "image" => Some(MessageType::Image),
            _ => None,
        }
    }
}

/// One chat turn inside an application thread. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Message {
    pub sender: UserId,
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub sent_at: DateTime<Utc>,
}

/// Status of an offer letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub enum OfferStatus {
    #[default]
    Sent,
    Accepted,
    Declined,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Sent => "Sent",
            OfferStatus::Accepted => "Accepted",
            OfferStatus::Declined => "Declined",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Sent" => Some(OfferStatus::Sent),
            "Accepted" => Some(OfferStatus::Accepted),
            "Declined" => Some(OfferStatus::Declined),
            _ => None,
        }
    }
}

/// Formal employment offer embedded in an application.
///
/// At most one offer is active at a time; re-sending overwrites.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OfferLetter {
    pub content: String,
    pub salary: String,
    pub joining_date: String,
    pub sent_at: DateTime<Utc>,
    #[serde(default)]
    pub status: OfferStatus,
}

/// One job seeker's candidacy for one job posting.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Application {
    pub application_id: ApplicationId,
    pub job: JobId,
    pub applicant: UserId,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub cover_letter: String,
    pub applied_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_letter: Option<OfferLetter>,
}

impl Application {
    /// Create a fresh Pending application.
    pub fn new(job: JobId, applicant: UserId, cover_letter: Option<String>) -> Self {
        let application_id = ApplicationId::for_pair(&job, &applicant);
        Self {
            application_id,
            job,
            applicant,
            status: ApplicationStatus::Pending,
            cover_letter: cover_letter.unwrap_or_default(),
            applied_at: Utc::now(),
            messages: Vec::new(),
            offer_letter: None,
        }
    }

    /// Apply a status change requested by `actor`.
    ///
    /// When the applicant responds to an outstanding offer, the offer's
    /// own status moves in the same mutation (Accepted → Accepted,
    /// Rejected → Declined) so the two never drift apart.
    pub fn set_status(&mut self, actor: Actor, target: ApplicationStatus) -> Result<(), TransitionError> {
        self.status = self.status.transition(actor, target)?;

        if actor == Actor::Applicant {
            if let Some(offer) = self.offer_letter.as_mut() {
                offer.status = match target {
                    ApplicationStatus::Accepted => OfferStatus::Accepted,
                    ApplicationStatus::Rejected => OfferStatus::Declined,
                    // Unreachable for applicants, guarded above.
                    ApplicationStatus::Pending => offer.status,
                };
            }
        }
        Ok(())
    }

    /// Record an offer letter. Issuing an offer always moves the
    /// application into the accepted pipeline in the same mutation.
    pub fn record_offer(&mut self, offer: OfferLetter) {
        self.offer_letter = Some(offer);
        self.status = ApplicationStatus::Accepted;
    }

    /// Append a message to the thread and return the stored entry.
    /// Existing entries are never touched.
    pub fn push_message(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Whether `user` participates in this application, given the
    /// employer that owns the job.
    pub fn is_participant(&self, user: &UserId, job_owner: &UserId) -> bool {
        &self.applicant == user || job_owner == user
    }

    /// The counterparty relative to `sender`, for notification routing.
    pub fn counterparty(&self, sender: &UserId, job_owner: &UserId) -> UserId {
        if sender == &self.applicant {
            job_owner.clone()
        } else {
            self.applicant.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer() -> OfferLetter {
        OfferLetter {
            content: "We are pleased to offer...".to_string(),
            salary: "80000".to_string(),
            joining_date: "2025-01-01".to_string(),
            sent_at: Utc::now(),
            status: OfferStatus::Sent,
        }
    }

    fn application() -> Application {
        Application::new(JobId::from("job-1"), UserId::from("seeker-1"), None)
    }

    #[test]
    fn test_new_application_is_pending() {
        let app = application();
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert!(app.messages.is_empty());
        assert!(app.offer_letter.is_none());
        assert_eq!(app.cover_letter, "");
    }

    #[test]
    fn test_employer_may_reach_every_state() {
        use ApplicationStatus::*;
        for current in [Pending, Accepted, Rejected] {
            for target in [Pending, Accepted, Rejected] {
                assert_eq!(current.transition(Actor::Employer, target), Ok(target));
            }
        }
    }

    #[test]
    fn test_applicant_may_only_accept_or_reject() {
        use ApplicationStatus::*;
        for current in [Pending, Accepted, Rejected] {
            assert_eq!(current.transition(Actor::Applicant, Accepted), Ok(Accepted));
            assert_eq!(current.transition(Actor::Applicant, Rejected), Ok(Rejected));
            assert_eq!(
                current.transition(Actor::Applicant, Pending),
                Err(TransitionError::ApplicantCannotReset)
            );
        }
    }

    #[test]
    fn test_status_parse_rejects_unknown_values() {
        assert_eq!(ApplicationStatus::parse("Accepted"), Some(ApplicationStatus::Accepted));
        assert_eq!(ApplicationStatus::parse("accepted"), None);
        assert_eq!(ApplicationStatus::parse("Withdrawn"), None);
        assert_eq!(ApplicationStatus::parse(""), None);
    }

    #[test]
    fn test_record_offer_forces_accepted() {
        let mut app = application();
        app.status = ApplicationStatus::Rejected;
        app.record_offer(offer());
        assert_eq!(app.status, ApplicationStatus::Accepted);
        assert_eq!(app.offer_letter.as_ref().unwrap().status, OfferStatus::Sent);
    }

    #[test]
    fn test_resending_offer_overwrites_previous() {
        let mut app = application();
        app.record_offer(offer());
        let mut second = offer();
        second.salary = "90000".to_string();
        app.record_offer(second);
        assert_eq!(app.offer_letter.as_ref().unwrap().salary, "90000");
    }

    #[test]
    fn test_applicant_response_moves_offer_status() {
        let mut app = application();
        app.record_offer(offer());

        app.set_status(Actor::Applicant, ApplicationStatus::Accepted).unwrap();
        assert_eq!(app.offer_letter.as_ref().unwrap().status, OfferStatus::Accepted);

        app.set_status(Actor::Applicant, ApplicationStatus::Rejected).unwrap();
        assert_eq!(app.offer_letter.as_ref().unwrap().status, OfferStatus::Declined);
    }

    #[test]
    fn test_employer_status_change_leaves_offer_status_alone() {
        let mut app = application();
        app.record_offer(offer());
        app.set_status(Actor::Employer, ApplicationStatus::Rejected).unwrap();
        assert_eq!(app.offer_letter.as_ref().unwrap().status, OfferStatus::Sent);
    }

    #[test]
    fn test_applicant_response_without_offer_is_plain_transition() {
        let mut app = application();
        app.set_status(Actor::Applicant, ApplicationStatus::Rejected).unwrap();
        assert_eq!(app.status, ApplicationStatus::Rejected);
        assert!(app.offer_letter.is_none());
    }

    #[test]
    fn test_messages_are_append_only() {
        let mut app = application();
        app.push_message(Message {
            sender: UserId::from("seeker-1"),
            content: "hello".to_string(),
            message_type: MessageType::Text,
            image_url: None,
            sent_at: Utc::now(),
        });
        app.push_message(Message {
            sender: UserId::from("emp-1"),
            content: "hi".to_string(),
            message_type: MessageType::Text,
            image_url: None,
            sent_at: Utc::now(),
        });
        assert_eq!(app.messages.len(), 2);
        assert_eq!(app.messages[0].content, "hello");
    }

    #[test]
    fn test_push_message_returns_the_appended_entry() {
        let mut app = application();
        let returned = app
            .push_message(Message {
                sender: UserId::from("seeker-1"),
                content: "hello".to_string(),
                message_type: MessageType::Text,
                image_url: None,
                sent_at: Utc::now(),
            })
            .clone();
        assert_eq!(returned.content, "hello");
        assert_eq!(app.messages.last().unwrap().content, returned.content);
    }

    #[test]
    fn test_participants_and_counterparty() {
        let app = application();
        let owner = UserId::from("emp-1");
        let outsider = UserId::from("stranger");

        assert!(app.is_participant(&UserId::from("seeker-1"), &owner));
        assert!(app.is_participant(&owner, &owner));
        assert!(!app.is_participant(&outsider, &owner));

        assert_eq!(app.counterparty(&UserId::from("seeker-1"), &owner), owner);
        assert_eq!(
            app.counterparty(&owner, &owner),
            UserId::from("seeker-1")
        );
    }
}
