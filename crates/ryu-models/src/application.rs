//! Job application models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Application status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Submitted, awaiting recruiter review.
    #[default]
    Pending,
    /// Shortlisted by the recruiter.
    Approved,
    Rejected,
    Hired,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
        }
    }

    /// Whether a recruiter may move an application from `self` to `next`.
    ///
    /// Legal moves: pending -> approved | rejected, approved -> hired |
    /// rejected. Rejected and hired are terminal; self-transitions are not
    /// allowed.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Hired) | (Approved, Rejected)
        )
    }

    /// Validate a transition, returning the rejected pair on failure.
    pub fn transition_to(
        &self,
        next: ApplicationStatus,
    ) -> Result<ApplicationStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError { from: *self, to: next })
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Illegal application status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move application from '{from}' to '{to}'")]
pub struct TransitionError {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
}

/// Application document as stored in the `applications` collection.
///
/// `job_title`, `candidate_name`, and `candidate_email` are snapshots taken
/// when the candidate applies; `recruiter_id` is copied from the job's
/// `company_id` at the same moment. At most one application exists per
/// (candidate, job) pair, enforced by a store-level unique index.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Application {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    pub job_id: String,
    pub job_title: String,

    pub candidate_id: String,
    pub candidate_name: String,
    pub candidate_email: String,

    /// Owning recruiter, copied from the job at creation.
    pub recruiter_id: String,

    #[serde(default)]
    pub status: ApplicationStatus,

    pub applied_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ApplicationStatus::*;

    #[test]
    fn pending_can_be_approved_or_rejected() {
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Hired));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn approved_can_be_hired_or_rejected() {
        assert!(Approved.can_transition_to(Hired));
        assert!(Approved.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Pending));
    }

    #[test]
    fn rejected_and_hired_are_terminal() {
        for next in [Pending, Approved, Rejected, Hired] {
            assert!(!Rejected.can_transition_to(next));
            assert!(!Hired.can_transition_to(next));
        }
    }

    #[test]
    fn transition_error_names_both_states() {
        let err = Hired.transition_to(Pending).unwrap_err();
        assert_eq!(err.from, Hired);
        assert_eq!(err.to, Pending);
        assert_eq!(err.to_string(), "cannot move application from 'hired' to 'pending'");
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Pending).unwrap(), "\"pending\"");
        let back: ApplicationStatus = serde_json::from_str("\"hired\"").unwrap();
        assert_eq!(back, Hired);
    }
}
