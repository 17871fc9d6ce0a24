//! User account models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::profile::CandidateProfile;
use crate::settings::{NotificationSettings, PrivacySettings, RecruiterPreferences};

/// Account role. Fixed at creation; no endpoint changes it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Recruiter,
    Candidate,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Recruiter => "recruiter",
            Role::Candidate => "candidate",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error for unknown role strings.
#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "recruiter" => Ok(Role::Recruiter),
            "candidate" => Ok(Role::Candidate),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// User document as stored in the `users` collection.
///
/// The password hash lives in the stored document under `password`; the
/// [`UserPublic`] projection is what every API response carries instead.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct User {
    /// Store-generated identifier.
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Display name.
    pub name: String,

    /// Login email. Globally unique across all roles (store index).
    pub email: String,

    /// Bcrypt hash of the password. Never exposed outward.
    pub password: String,

    /// Account role.
    pub role: Role,

    /// Company name; present for recruiters only.
    #[serde(default)]
    pub company: Option<String>,

    /// Active flag. Persisted but not consulted at login.
    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Candidate profile substructure. Empty-but-present for candidates
    /// at signup, absent for other roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<CandidateProfile>,

    /// Per-user notification settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_settings: Option<NotificationSettings>,

    /// Per-user privacy settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_settings: Option<PrivacySettings>,

    /// Recruiter workflow preferences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recruitment_preferences: Option<RecruiterPreferences>,
}

fn default_true() -> bool {
    true
}

impl User {
    /// Password-free projection for API responses.
    pub fn public(&self) -> UserPublic {
        UserPublic {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            company: self.company.clone(),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            profile: self.profile.clone(),
            notification_settings: self.notification_settings.clone(),
            privacy_settings: self.privacy_settings.clone(),
            recruitment_preferences: self.recruitment_preferences.clone(),
        }
    }
}

/// User projection with the password hash stripped.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UserPublic {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub company: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<CandidateProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_settings: Option<NotificationSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_settings: Option<PrivacySettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recruitment_preferences: Option<RecruiterPreferences>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_serde() {
        let json = serde_json::to_string(&Role::Recruiter).unwrap();
        assert_eq!(json, "\"recruiter\"");
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Role::Recruiter);
    }

    #[test]
    fn role_from_str_rejects_unknown() {
        assert!("superuser".parse::<Role>().is_err());
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    }

    #[test]
    fn public_projection_has_no_password() {
        let user = User {
            id: "u1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "$2b$12$secret".to_string(),
            role: Role::Candidate,
            company: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
            profile: Some(CandidateProfile::default()),
            notification_settings: None,
            privacy_settings: None,
            recruitment_preferences: None,
        };

        let value = serde_json::to_value(user.public()).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["_id"], "u1");
        assert_eq!(value["role"], "candidate");
    }
}
