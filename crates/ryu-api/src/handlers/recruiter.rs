//! Recruiter handlers: job postings, application review, and settings.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use ryu_models::{
    Application, ApplicationStatus, NotificationSettings, PrivacySettings, RecruiterPreferences,
    Role, UserPublic,
};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::admin::{
    JobWithApplications, MessageResponse, PasswordChangeRequest, ProfileUpdateRequest,
    ProfileUpdateResponse,
};
use crate::services::NewJob;
use crate::state::AppState;

/// Recruiter dashboard stats. The per-hire cost and timing figures are
/// dashboard placeholders, not derived from stored data.
#[derive(Serialize)]
pub struct RecruiterStatsResponse {
    pub total_applicants: u64,
    pub shortlisted_candidates: u64,
    pub hired_candidates: u64,
    pub rejected_candidates: u64,
    pub cost_per_hire: u64,
    pub time_to_hire: u64,
    pub time_to_fill: u64,
    pub total_jobs: u64,
}

pub async fn get_recruiter_stats(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<RecruiterStatsResponse>> {
    let recruiter = current.require_role(Role::Recruiter)?;

    let stats = state.board.recruiter_stats(&recruiter.id).await?;
    Ok(Json(RecruiterStatsResponse {
        total_applicants: stats.total_applicants,
        shortlisted_candidates: stats.shortlisted_candidates,
        hired_candidates: stats.hired_candidates,
        rejected_candidates: stats.rejected_candidates,
        cost_per_hire: 17000,
        time_to_hire: 15,
        time_to_fill: 26,
        total_jobs: stats.total_jobs,
    }))
}

/// New job posting request.
#[derive(Debug, Deserialize, Validate)]
pub struct JobCreateRequest {
    #[validate(length(min = 1))]
    pub title: String,
    pub skills_required: String,
    pub experience_years: u32,
    pub qualification: String,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary_range: Option<String>,
}

#[derive(Serialize)]
pub struct JobCreateResponse {
    pub message: String,
    pub job_id: String,
}

pub async fn create_job(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<JobCreateRequest>,
) -> ApiResult<Json<JobCreateResponse>> {
    let recruiter = current.require_role(Role::Recruiter)?;
    request
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let job = state
        .board
        .create_job(
            recruiter,
            NewJob {
                title: request.title,
                skills_required: request.skills_required,
                experience_years: request.experience_years,
                qualification: request.qualification,
                description: request.description,
                location: request.location,
                salary_range: request.salary_range,
            },
        )
        .await?;

    Ok(Json(JobCreateResponse {
        message: "Job created successfully".to_string(),
        job_id: job.id,
    }))
}

pub async fn get_recruiter_jobs(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<JobWithApplications>>> {
    let recruiter = current.require_role(Role::Recruiter)?;

    let jobs = state
        .board
        .jobs_with_counts(&recruiter.id)
        .await?
        .into_iter()
        .map(|(job, total_applications)| JobWithApplications {
            job,
            total_applications,
        })
        .collect();
    Ok(Json(jobs))
}

pub async fn delete_job(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let recruiter = current.require_role(Role::Recruiter)?;
    state
        .board
        .delete_recruiter_job(&recruiter.id, &job_id)
        .await?;
    Ok(Json(MessageResponse::new("Job deleted successfully")))
}

/// Application with the candidate's current record joined in.
#[derive(Serialize)]
pub struct ApplicationWithCandidate {
    #[serde(flatten)]
    pub application: Application,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_details: Option<UserPublic>,
}

pub async fn get_job_applications(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Vec<ApplicationWithCandidate>>> {
    let recruiter = current.require_role(Role::Recruiter)?;

    let applications = state
        .board
        .job_applications_for_recruiter(&recruiter.id, &job_id)
        .await?
        .into_iter()
        .map(|(application, candidate_details)| ApplicationWithCandidate {
            application,
            candidate_details,
        })
        .collect();
    Ok(Json(applications))
}

/// Application status update request.
#[derive(Debug, Deserialize)]
pub struct ApplicationUpdateRequest {
    pub status: ApplicationStatus,
}

pub async fn update_application_status(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(application_id): Path<String>,
    Json(request): Json<ApplicationUpdateRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let recruiter = current.require_role(Role::Recruiter)?;
    state
        .board
        .update_application_status(&recruiter.id, &application_id, request.status)
        .await?;
    Ok(Json(MessageResponse::new(
        "Application status updated successfully",
    )))
}

pub async fn update_recruiter_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<ProfileUpdateRequest>,
) -> ApiResult<Json<ProfileUpdateResponse>> {
    let recruiter = current.require_role(Role::Recruiter)?;
    request
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let updated = state
        .accounts
        .update_identity(&recruiter.id, &request.name, &request.email, request.company)
        .await?;

    Ok(Json(ProfileUpdateResponse {
        message: "Profile updated successfully".to_string(),
        user: updated.public(),
    }))
}

pub async fn change_recruiter_password(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<PasswordChangeRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let recruiter = current.require_role(Role::Recruiter)?;
    state
        .accounts
        .change_password(recruiter, &request.current_password, &request.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

pub async fn update_recruiter_notifications(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(settings): Json<NotificationSettings>,
) -> ApiResult<Json<MessageResponse>> {
    let recruiter = current.require_role(Role::Recruiter)?;
    state
        .accounts
        .update_notification_settings(&recruiter.id, &settings)
        .await?;
    Ok(Json(MessageResponse::new(
        "Notification settings updated successfully",
    )))
}

pub async fn update_recruiter_privacy(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(settings): Json<PrivacySettings>,
) -> ApiResult<Json<MessageResponse>> {
    let recruiter = current.require_role(Role::Recruiter)?;
    state
        .accounts
        .update_privacy_settings(&recruiter.id, &settings)
        .await?;
    Ok(Json(MessageResponse::new(
        "Privacy settings updated successfully",
    )))
}

pub async fn update_recruiter_preferences(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(preferences): Json<RecruiterPreferences>,
) -> ApiResult<Json<MessageResponse>> {
    let recruiter = current.require_role(Role::Recruiter)?;
    state
        .accounts
        .update_preferences(&recruiter.id, &preferences)
        .await?;
    Ok(Json(MessageResponse::new("Preferences updated successfully")))
}

pub async fn delete_recruiter_account(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<MessageResponse>> {
    let recruiter = current.require_role(Role::Recruiter)?;
    state.accounts.delete_account(recruiter).await?;
    Ok(Json(MessageResponse::new(
        "Recruiter account and all associated data deleted successfully",
    )))
}
