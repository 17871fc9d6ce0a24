//! Typed repositories over the raw document store.
//!
//! Repositories own their collection names, the serde conversion between
//! model structs and stored JSON, and the cascade specs for their entity.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use ryu_models::{
    Application, ApplicationStatus, BackupRecord, Job, Role, SecuritySettings, SystemSettings,
    User,
};

use crate::error::{StoreError, StoreResult};
use crate::store::{DeleteSpec, DocumentStore, JsonMap};

/// Collection names.
pub mod collections {
    pub const USERS: &str = "users";
    pub const JOBS: &str = "jobs";
    pub const APPLICATIONS: &str = "applications";
    pub const SYSTEM_SETTINGS: &str = "system_settings";
    pub const SECURITY_SETTINGS: &str = "security_settings";
    pub const BACKUPS: &str = "backups";
}

/// Singleton document ids.
const PLATFORM_SETTINGS_DOC: &str = "platform_settings";
const SECURITY_CONFIG_DOC: &str = "security_config";

/// Build the store with the job-board's unique constraints declared:
/// one account per email, one application per (candidate, job) pair.
pub fn build_store() -> DocumentStore {
    DocumentStore::builder()
        .unique_index(collections::USERS, &["email"])
        .unique_index(collections::APPLICATIONS, &["candidate_id", "job_id"])
        .build()
}

fn to_map<T: Serialize>(value: &T) -> StoreResult<JsonMap> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::invalid_document(format!(
            "expected object, got {}",
            other
        ))),
    }
}

fn from_map<T: DeserializeOwned>(map: JsonMap) -> StoreResult<T> {
    Ok(serde_json::from_value(Value::Object(map))?)
}

fn from_maps<T: DeserializeOwned>(maps: Vec<JsonMap>) -> StoreResult<Vec<T>> {
    maps.into_iter().map(from_map).collect()
}

/// Repository for user documents.
#[derive(Clone)]
pub struct UserRepo {
    store: Arc<DocumentStore>,
}

impl UserRepo {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Insert a user. The store's email index rejects duplicates.
    pub async fn create(&self, user: &User) -> StoreResult<String> {
        let id = self.store.insert(collections::USERS, to_map(user)?).await?;
        info!(user_id = %id, role = %user.role, "created user");
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> StoreResult<Option<User>> {
        match self.store.get(collections::USERS, id).await? {
            Some(map) => Ok(Some(from_map(map)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        match self
            .store
            .find_one_eq(collections::USERS, "email", &Value::String(email.to_string()))
            .await?
        {
            Some(map) => Ok(Some(from_map(map)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_role(&self, role: Role) -> StoreResult<Vec<User>> {
        let maps = self
            .store
            .find_eq(collections::USERS, "role", &Value::String(role.as_str().to_string()))
            .await?;
        from_maps(maps)
    }

    /// First user with the given role, if any. Used by the idempotent
    /// admin bootstrap.
    pub async fn find_one_by_role(&self, role: Role) -> StoreResult<Option<User>> {
        Ok(self.find_by_role(role).await?.into_iter().next())
    }

    /// Merge a field patch into a user document. Changing `email` re-keys
    /// the unique index; a collision with another account surfaces as
    /// `UniqueViolation`.
    pub async fn update_fields(&self, id: &str, patch: JsonMap) -> StoreResult<User> {
        let map = self.store.update(collections::USERS, id, patch).await?;
        from_map(map)
    }

    pub async fn count(&self) -> StoreResult<u64> {
        self.store.count(collections::USERS).await
    }

    pub async fn count_role(&self, role: Role) -> StoreResult<u64> {
        self.store
            .count_eq(collections::USERS, "role", &Value::String(role.as_str().to_string()))
            .await
    }

    /// Remove a user and every dependent record in one atomic batch:
    /// their jobs (as recruiter), every application they filed (as
    /// candidate), and every application against their jobs. The
    /// `recruiter_id` snapshot on applications covers the last group
    /// without a pre-read of job ids.
    pub async fn delete_cascade(&self, user_id: &str) -> StoreResult<usize> {
        let removed = self
            .store
            .batch_delete(&[
                DeleteSpec::by_id(collections::USERS, user_id),
                DeleteSpec::by_field(collections::JOBS, "company_id", user_id),
                DeleteSpec::by_field(collections::APPLICATIONS, "candidate_id", user_id),
                DeleteSpec::by_field(collections::APPLICATIONS, "recruiter_id", user_id),
            ])
            .await?;
        info!(user_id, removed, "user cascade delete");
        Ok(removed)
    }
}

/// Repository for job documents.
#[derive(Clone)]
pub struct JobRepo {
    store: Arc<DocumentStore>,
}

impl JobRepo {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, job: &Job) -> StoreResult<String> {
        let id = self.store.insert(collections::JOBS, to_map(job)?).await?;
        info!(job_id = %id, company_id = %job.company_id, "created job");
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> StoreResult<Option<Job>> {
        match self.store.get(collections::JOBS, id).await? {
            Some(map) => Ok(Some(from_map(map)?)),
            None => Ok(None),
        }
    }

    /// All jobs owned by a recruiter.
    pub async fn find_by_company(&self, company_id: &str) -> StoreResult<Vec<Job>> {
        let maps = self
            .store
            .find_eq(collections::JOBS, "company_id", &Value::String(company_id.to_string()))
            .await?;
        from_maps(maps)
    }

    /// All jobs currently accepting applications.
    pub async fn find_open(&self) -> StoreResult<Vec<Job>> {
        let maps = self
            .store
            .find_eq(collections::JOBS, "status", &Value::String("open".to_string()))
            .await?;
        from_maps(maps)
    }

    pub async fn count(&self) -> StoreResult<u64> {
        self.store.count(collections::JOBS).await
    }

    /// Remove a job and all applications referencing it, atomically.
    pub async fn delete_cascade(&self, job_id: &str) -> StoreResult<usize> {
        let removed = self
            .store
            .batch_delete(&[
                DeleteSpec::by_id(collections::JOBS, job_id),
                DeleteSpec::by_field(collections::APPLICATIONS, "job_id", job_id),
            ])
            .await?;
        info!(job_id, removed, "job cascade delete");
        Ok(removed)
    }
}

/// Repository for application documents.
#[derive(Clone)]
pub struct ApplicationRepo {
    store: Arc<DocumentStore>,
}

impl ApplicationRepo {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Insert an application. The compound (candidate_id, job_id) index
    /// rejects a second application for the same pair.
    pub async fn create(&self, application: &Application) -> StoreResult<String> {
        let id = self
            .store
            .insert(collections::APPLICATIONS, to_map(application)?)
            .await?;
        info!(
            application_id = %id,
            job_id = %application.job_id,
            candidate_id = %application.candidate_id,
            "created application"
        );
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> StoreResult<Option<Application>> {
        match self.store.get(collections::APPLICATIONS, id).await? {
            Some(map) => Ok(Some(from_map(map)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_candidate(&self, candidate_id: &str) -> StoreResult<Vec<Application>> {
        let maps = self
            .store
            .find_eq(
                collections::APPLICATIONS,
                "candidate_id",
                &Value::String(candidate_id.to_string()),
            )
            .await?;
        from_maps(maps)
    }

    pub async fn find_by_job(&self, job_id: &str) -> StoreResult<Vec<Application>> {
        let maps = self
            .store
            .find_eq(collections::APPLICATIONS, "job_id", &Value::String(job_id.to_string()))
            .await?;
        from_maps(maps)
    }

    /// All applications whose job is in the given set.
    pub async fn find_by_jobs(&self, job_ids: &[String]) -> StoreResult<Vec<Application>> {
        let values: Vec<Value> = job_ids.iter().map(|id| Value::String(id.clone())).collect();
        let maps = self
            .store
            .find_in(collections::APPLICATIONS, "job_id", &values)
            .await?;
        from_maps(maps)
    }

    /// The candidate's application for a specific job, if one exists.
    pub async fn find_for_pair(
        &self,
        candidate_id: &str,
        job_id: &str,
    ) -> StoreResult<Option<Application>> {
        Ok(self
            .find_by_candidate(candidate_id)
            .await?
            .into_iter()
            .find(|app| app.job_id == job_id))
    }

    /// Overwrite the status and stamp `updated_at`.
    pub async fn set_status(
        &self,
        id: &str,
        status: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<Application> {
        let mut patch = JsonMap::new();
        patch.insert(
            "status".to_string(),
            Value::String(status.as_str().to_string()),
        );
        patch.insert("updated_at".to_string(), serde_json::to_value(now)?);
        let map = self.store.update(collections::APPLICATIONS, id, patch).await?;
        from_map(map)
    }

    /// Single-row delete; no cascade. Idempotent.
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        self.store.delete(collections::APPLICATIONS, id).await
    }

    pub async fn count(&self) -> StoreResult<u64> {
        self.store.count(collections::APPLICATIONS).await
    }

    pub async fn count_for_job(&self, job_id: &str) -> StoreResult<u64> {
        self.store
            .count_eq(collections::APPLICATIONS, "job_id", &Value::String(job_id.to_string()))
            .await
    }
}

/// Repository for the singleton configuration documents.
#[derive(Clone)]
pub struct SettingsRepo {
    store: Arc<DocumentStore>,
}

impl SettingsRepo {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn upsert_system(
        &self,
        settings: &SystemSettings,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut patch = to_map(settings)?;
        patch.insert("updated_at".to_string(), serde_json::to_value(now)?);
        patch.insert("updated_by".to_string(), Value::String(updated_by.to_string()));
        self.store
            .upsert(collections::SYSTEM_SETTINGS, PLATFORM_SETTINGS_DOC, patch)
            .await?;
        Ok(())
    }

    pub async fn upsert_security(
        &self,
        settings: &SecuritySettings,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut patch = to_map(settings)?;
        patch.insert("updated_at".to_string(), serde_json::to_value(now)?);
        patch.insert("updated_by".to_string(), Value::String(updated_by.to_string()));
        self.store
            .upsert(collections::SECURITY_SETTINGS, SECURITY_CONFIG_DOC, patch)
            .await?;
        Ok(())
    }
}

/// Append-only repository for backup records.
#[derive(Clone)]
pub struct BackupRepo {
    store: Arc<DocumentStore>,
}

impl BackupRepo {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn append(&self, record: &BackupRecord) -> StoreResult<String> {
        self.store.insert(collections::BACKUPS, to_map(record)?).await
    }
}
