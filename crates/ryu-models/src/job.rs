//! Job posting models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Job posting status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepting applications.
    #[default]
    Open,
    /// No longer listed to candidates.
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Job document as stored in the `jobs` collection.
///
/// `company_id` is the owning recruiter's user id, fixed at creation.
/// `company_name` and `recruiter_name` are snapshots taken at creation and
/// are not kept in sync with later changes to the recruiter's account.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    pub title: String,

    /// Free-text list of required skills.
    pub skills_required: String,

    /// Required years of experience.
    pub experience_years: u32,

    pub qualification: String,

    pub description: String,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub salary_range: Option<String>,

    /// Owning recruiter's user id.
    pub company_id: String,

    /// Company name snapshot.
    pub company_name: String,

    /// Recruiter display-name snapshot.
    pub recruiter_name: String,

    #[serde(default)]
    pub status: JobStatus,

    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&JobStatus::Open).unwrap(), "\"open\"");
        assert_eq!(
            serde_json::to_string(&JobStatus::Closed).unwrap(),
            "\"closed\""
        );
    }

    #[test]
    fn missing_status_defaults_to_open() {
        let job: Job = serde_json::from_value(serde_json::json!({
            "title": "Backend Engineer",
            "skills_required": "rust, axum",
            "experience_years": 3,
            "qualification": "BSc",
            "description": "Build the API",
            "company_id": "r1",
            "company_name": "Acme",
            "recruiter_name": "Rae",
            "created_at": Utc::now(),
        }))
        .unwrap();
        assert_eq!(job.status, JobStatus::Open);
        assert!(job.id.is_empty());
    }
}
