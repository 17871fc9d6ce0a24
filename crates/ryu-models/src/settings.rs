//! Settings documents: per-user preference blobs and the platform-wide
//! singleton configuration documents.
//!
//! Field names stay camelCase to match the stored documents and the
//! frontend payloads verbatim.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn yes() -> bool {
    true
}

/// Notification preferences stored on the user document. The recruiter and
/// admin dashboards each use their own subset of the fields.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    // Recruiter-facing
    #[serde(default = "yes")]
    pub email_application_alerts: bool,
    #[serde(default = "yes")]
    pub email_job_expiry_reminders: bool,
    #[serde(default = "yes")]
    pub email_weekly_reports: bool,
    #[serde(default)]
    pub email_newsletter: bool,
    #[serde(default = "yes")]
    pub push_notifications: bool,
    // Admin-facing
    #[serde(default = "yes")]
    pub system_alerts: bool,
    #[serde(default = "yes")]
    pub user_registrations: bool,
    #[serde(default = "yes")]
    pub security_notifications: bool,
    #[serde(default = "yes")]
    pub maintenance_alerts: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).expect("defaults are total")
    }
}

/// Privacy preferences stored on the user document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySettings {
    #[serde(default = "default_visibility")]
    pub company_profile_visibility: String,
    #[serde(default = "yes")]
    pub show_contact_info: bool,
    #[serde(default = "yes")]
    pub allow_direct_messages: bool,
}

fn default_visibility() -> String {
    "public".to_string()
}

impl Default for PrivacySettings {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).expect("defaults are total")
    }
}

/// Recruiter workflow preferences.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecruiterPreferences {
    #[serde(default = "default_auto_reject_days")]
    pub auto_reject_after_days: u32,
    #[serde(default)]
    pub require_cover_letter: bool,
    #[serde(default = "yes")]
    pub enable_ai_screening: bool,
    #[serde(default = "yes")]
    pub send_auto_responses: bool,
}

fn default_auto_reject_days() -> u32 {
    30
}

impl Default for RecruiterPreferences {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).expect("defaults are total")
    }
}

/// Platform-wide settings. Singleton document `platform_settings` in the
/// `system_settings` collection, upserted by admins.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    #[serde(default = "yes")]
    pub allow_public_registration: bool,
    #[serde(default = "yes")]
    pub require_email_verification: bool,
    #[serde(default = "yes")]
    pub enable_audit_logging: bool,
    #[serde(default = "yes")]
    pub auto_backup_enabled: bool,
    #[serde(default)]
    pub maintenance_mode: bool,
}

impl Default for SystemSettings {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).expect("defaults are total")
    }
}

/// Security policy knobs. Singleton document `security_config` in the
/// `security_settings` collection.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    #[serde(default = "default_session_timeout")]
    pub session_timeout: u32,
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,
    #[serde(default = "default_password_min_length")]
    pub password_min_length: u32,
    #[serde(default)]
    pub require_two_factor: bool,
    #[serde(default)]
    pub ip_whitelist: String,
}

fn default_session_timeout() -> u32 {
    30
}

fn default_max_login_attempts() -> u32 {
    5
}

fn default_password_min_length() -> u32 {
    8
}

impl Default for SecuritySettings {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).expect("defaults are total")
    }
}

/// Append-only backup stub written by the admin system-backup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BackupRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Human-facing id, `backup_YYYYmmdd_HHMMSS`.
    pub backup_id: String,

    pub created_at: DateTime<Utc>,

    /// Admin user id that triggered the backup.
    pub created_by: String,

    pub status: String,

    /// Always "manual"; there is no scheduled path.
    #[serde(rename = "type")]
    pub backup_type: String,

    pub collections_backed_up: Vec<String>,
}

impl BackupRecord {
    /// Collections covered by a backup.
    pub const COLLECTIONS: [&'static str; 5] = [
        "users",
        "jobs",
        "applications",
        "system_settings",
        "security_settings",
    ];

    /// Build a completed manual backup record stamped `at`.
    pub fn manual(created_by: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            backup_id: format!("backup_{}", at.format("%Y%m%d_%H%M%S")),
            created_at: at,
            created_by: created_by.into(),
            status: "completed".to_string(),
            backup_type: "manual".to_string(),
            collections_backed_up: Self::COLLECTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_defaults_match_dashboard_expectations() {
        let settings = NotificationSettings::default();
        assert!(settings.email_application_alerts);
        assert!(!settings.email_newsletter);
        assert!(settings.system_alerts);
    }

    #[test]
    fn settings_round_trip_camel_case() {
        let json = serde_json::to_value(PrivacySettings::default()).unwrap();
        assert_eq!(json["companyProfileVisibility"], "public");
        assert_eq!(json["showContactInfo"], true);
    }

    #[test]
    fn partial_payload_fills_defaults() {
        let settings: SecuritySettings =
            serde_json::from_value(serde_json::json!({"sessionTimeout": 60})).unwrap();
        assert_eq!(settings.session_timeout, 60);
        assert_eq!(settings.max_login_attempts, 5);
        assert_eq!(settings.password_min_length, 8);
    }

    #[test]
    fn manual_backup_record_shape() {
        let at = "2026-01-02T03:04:05Z".parse().unwrap();
        let record = BackupRecord::manual("admin-1", at);
        assert_eq!(record.backup_id, "backup_20260102_030405");
        assert_eq!(record.status, "completed");
        assert_eq!(record.backup_type, "manual");
        assert_eq!(record.collections_backed_up.len(), 5);
    }
}
