//! Jobs and applications: creation, listings, status updates, cascades,
//! and the read-side aggregates for the dashboards.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use ryu_models::{
    Application, ApplicationStatus, BackupRecord, Job, JobStatus, Role, SecuritySettings,
    SystemSettings, User, UserPublic,
};
use ryu_store::{
    ApplicationRepo, BackupRepo, DocumentStore, JobRepo, SettingsRepo, StoreError, UserRepo,
};

use crate::error::{ApiError, ApiResult};

/// Input for a new job posting.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub skills_required: String,
    pub experience_years: u32,
    pub qualification: String,
    pub description: String,
    pub location: Option<String>,
    pub salary_range: Option<String>,
}

/// Admin dashboard totals.
#[derive(Debug, Clone, Copy)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_recruiters: u64,
    pub total_candidates: u64,
    pub total_jobs: u64,
    pub total_applications: u64,
}

/// Recruiter dashboard totals, scoped to the caller's jobs.
#[derive(Debug, Clone, Copy)]
pub struct RecruiterStats {
    pub total_applicants: u64,
    pub shortlisted_candidates: u64,
    pub hired_candidates: u64,
    pub rejected_candidates: u64,
    pub total_jobs: u64,
}

/// Board service over jobs, applications, and the admin-side documents.
#[derive(Clone)]
pub struct BoardService {
    users: UserRepo,
    jobs: JobRepo,
    applications: ApplicationRepo,
    settings: SettingsRepo,
    backups: BackupRepo,
}

impl BoardService {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self {
            users: UserRepo::new(Arc::clone(&store)),
            jobs: JobRepo::new(Arc::clone(&store)),
            applications: ApplicationRepo::new(Arc::clone(&store)),
            settings: SettingsRepo::new(Arc::clone(&store)),
            backups: BackupRepo::new(store),
        }
    }

    // =========================================================================
    // Jobs
    // =========================================================================

    /// Create a job owned by the recruiter, snapshotting their company and
    /// display name as of now.
    pub async fn create_job(&self, recruiter: &User, input: NewJob) -> ApiResult<Job> {
        let mut job = Job {
            id: String::new(),
            title: input.title,
            skills_required: input.skills_required,
            experience_years: input.experience_years,
            qualification: input.qualification,
            description: input.description,
            location: input.location,
            salary_range: input.salary_range,
            company_id: recruiter.id.clone(),
            company_name: recruiter.company.clone().unwrap_or_default(),
            recruiter_name: recruiter.name.clone(),
            status: JobStatus::Open,
            created_at: Utc::now(),
        };
        job.id = self.jobs.create(&job).await?;
        Ok(job)
    }

    /// A recruiter's (or, for the admin view, any company's) jobs with the
    /// number of applications each has received.
    pub async fn jobs_with_counts(&self, company_id: &str) -> ApiResult<Vec<(Job, u64)>> {
        let jobs = self.jobs.find_by_company(company_id).await?;
        let mut out = Vec::with_capacity(jobs.len());
        for job in jobs {
            let count = self.applications.count_for_job(&job.id).await?;
            out.push((job, count));
        }
        Ok(out)
    }

    /// Delete a job the recruiter owns, cascading to its applications.
    /// A job that exists but belongs to someone else reads as absent.
    pub async fn delete_recruiter_job(&self, recruiter_id: &str, job_id: &str) -> ApiResult<()> {
        let job = self
            .jobs
            .get(job_id)
            .await?
            .filter(|j| j.company_id == recruiter_id)
            .ok_or_else(|| ApiError::not_found("Job not found"))?;

        self.jobs.delete_cascade(&job.id).await?;
        Ok(())
    }

    // =========================================================================
    // Applications
    // =========================================================================

    /// Applications for one of the recruiter's jobs, joined with each
    /// candidate's password-free record.
    pub async fn job_applications_for_recruiter(
        &self,
        recruiter_id: &str,
        job_id: &str,
    ) -> ApiResult<Vec<(Application, Option<UserPublic>)>> {
        self.jobs
            .get(job_id)
            .await?
            .filter(|j| j.company_id == recruiter_id)
            .ok_or_else(|| ApiError::not_found("Job not found"))?;

        let applications = self.applications.find_by_job(job_id).await?;
        let mut out = Vec::with_capacity(applications.len());
        for application in applications {
            let candidate = self.users.get(&application.candidate_id).await?;
            out.push((application, candidate.map(|u| u.public())));
        }
        Ok(out)
    }

    /// Move an application to a new status, stamping `updated_at`.
    /// Only the owning recruiter may do this, and only along the legal
    /// transitions; anything else is rejected before any write.
    pub async fn update_application_status(
        &self,
        recruiter_id: &str,
        application_id: &str,
        status: ApplicationStatus,
    ) -> ApiResult<Application> {
        let application = self
            .applications
            .get(application_id)
            .await?
            .filter(|a| a.recruiter_id == recruiter_id)
            .ok_or_else(|| ApiError::not_found("Application not found"))?;

        application
            .status
            .transition_to(status)
            .map_err(|e| ApiError::validation(e.to_string()))?;

        let updated = self
            .applications
            .set_status(application_id, status, Utc::now())
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => ApiError::not_found("Application not found"),
                other => other.into(),
            })?;
        Ok(updated)
    }

    /// Open jobs decorated with the candidate's own application state.
    pub async fn open_jobs_for_candidate(
        &self,
        candidate_id: &str,
    ) -> ApiResult<Vec<(Job, Option<ApplicationStatus>)>> {
        let jobs = self.jobs.find_open().await?;
        let mine = self.applications.find_by_candidate(candidate_id).await?;

        Ok(jobs
            .into_iter()
            .map(|job| {
                let status = mine
                    .iter()
                    .find(|app| app.job_id == job.id)
                    .map(|app| app.status);
                (job, status)
            })
            .collect())
    }

    /// Apply to a job. The compound unique index makes a second
    /// application for the same pair fail atomically with `Conflict`.
    pub async fn apply(&self, candidate: &User, job_id: &str) -> ApiResult<Application> {
        let job = self
            .jobs
            .get(job_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Job not found"))?;

        let mut application = Application {
            id: String::new(),
            job_id: job.id.clone(),
            job_title: job.title.clone(),
            candidate_id: candidate.id.clone(),
            candidate_name: candidate.name.clone(),
            candidate_email: candidate.email.clone(),
            recruiter_id: job.company_id.clone(),
            status: ApplicationStatus::Pending,
            applied_at: Utc::now(),
            updated_at: None,
        };

        application.id = self.applications.create(&application).await.map_err(|e| {
            if e.is_unique_violation() {
                ApiError::conflict("Already applied for this job")
            } else {
                e.into()
            }
        })?;
        Ok(application)
    }

    /// The candidate's applications joined with current job details.
    pub async fn candidate_applications_with_jobs(
        &self,
        candidate_id: &str,
    ) -> ApiResult<Vec<(Application, Option<Job>)>> {
        let applications = self.applications.find_by_candidate(candidate_id).await?;
        let mut out = Vec::with_capacity(applications.len());
        for application in applications {
            let job = self.jobs.get(&application.job_id).await?;
            out.push((application, job));
        }
        Ok(out)
    }

    /// Withdraw one of the candidate's own applications. No cascade.
    pub async fn withdraw(&self, candidate_id: &str, application_id: &str) -> ApiResult<()> {
        self.applications
            .get(application_id)
            .await?
            .filter(|a| a.candidate_id == candidate_id)
            .ok_or_else(|| ApiError::not_found("Application not found"))?;

        self.applications.delete(application_id).await?;
        info!(application_id, candidate_id, "application withdrawn");
        Ok(())
    }

    // =========================================================================
    // Admin read side
    // =========================================================================

    pub async fn admin_stats(&self) -> ApiResult<AdminStats> {
        Ok(AdminStats {
            total_users: self.users.count().await?,
            total_recruiters: self.users.count_role(Role::Recruiter).await?,
            total_candidates: self.users.count_role(Role::Candidate).await?,
            total_jobs: self.jobs.count().await?,
            total_applications: self.applications.count().await?,
        })
    }

    pub async fn recruiter_stats(&self, recruiter_id: &str) -> ApiResult<RecruiterStats> {
        let jobs = self.jobs.find_by_company(recruiter_id).await?;
        let job_ids: Vec<String> = jobs.iter().map(|j| j.id.clone()).collect();
        let applications = self.applications.find_by_jobs(&job_ids).await?;

        let count_status = |status: ApplicationStatus| {
            applications.iter().filter(|a| a.status == status).count() as u64
        };

        Ok(RecruiterStats {
            total_applicants: applications.len() as u64,
            shortlisted_candidates: count_status(ApplicationStatus::Approved),
            hired_candidates: count_status(ApplicationStatus::Hired),
            rejected_candidates: count_status(ApplicationStatus::Rejected),
            total_jobs: jobs.len() as u64,
        })
    }

    /// All recruiter accounts, password-free.
    pub async fn customers(&self) -> ApiResult<Vec<UserPublic>> {
        Ok(self
            .users
            .find_by_role(Role::Recruiter)
            .await?
            .into_iter()
            .map(|u| u.public())
            .collect())
    }

    /// All candidate accounts with their profile completion score.
    pub async fn candidates_with_completion(&self) -> ApiResult<Vec<(UserPublic, u8)>> {
        Ok(self
            .users
            .find_by_role(Role::Candidate)
            .await?
            .into_iter()
            .map(|u| {
                let score = u
                    .profile
                    .as_ref()
                    .map(|p| p.completion_score())
                    .unwrap_or(0);
                (u.public(), score)
            })
            .collect())
    }

    /// Applications across all of a company's jobs.
    pub async fn company_applications(&self, company_id: &str) -> ApiResult<Vec<Application>> {
        let jobs = self.jobs.find_by_company(company_id).await?;
        let job_ids: Vec<String> = jobs.iter().map(|j| j.id.clone()).collect();
        Ok(self.applications.find_by_jobs(&job_ids).await?)
    }

    /// A candidate's applications with each job's company-name snapshot,
    /// when the job still exists.
    pub async fn candidate_applications_with_company(
        &self,
        candidate_id: &str,
    ) -> ApiResult<Vec<(Application, Option<String>)>> {
        let applications = self.applications.find_by_candidate(candidate_id).await?;
        let mut out = Vec::with_capacity(applications.len());
        for application in applications {
            let company = self
                .jobs
                .get(&application.job_id)
                .await?
                .map(|j| j.company_name);
            out.push((application, company));
        }
        Ok(out)
    }

    // =========================================================================
    // Platform documents
    // =========================================================================

    pub async fn update_system_settings(
        &self,
        admin_id: &str,
        settings: &SystemSettings,
    ) -> ApiResult<()> {
        self.settings
            .upsert_system(settings, admin_id, Utc::now())
            .await?;
        Ok(())
    }

    pub async fn update_security_settings(
        &self,
        admin_id: &str,
        settings: &SecuritySettings,
    ) -> ApiResult<()> {
        self.settings
            .upsert_security(settings, admin_id, Utc::now())
            .await?;
        Ok(())
    }

    /// Write the manual backup stub and return its backup id.
    pub async fn record_backup(&self, admin_id: &str) -> ApiResult<String> {
        let record = BackupRecord::manual(admin_id, Utc::now());
        self.backups
            .append(&record)
            .await
            .map_err(|e| ApiError::internal(format!("Backup failed: {}", e)))?;
        info!(backup_id = %record.backup_id, "system backup recorded");
        Ok(record.backup_id)
    }
}
